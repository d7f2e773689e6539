/// Tests for SoftwareDevice
///
/// These tests exercise the CPU rasterizer directly through the device
/// trait: program evaluation, input sampling, MRT writes, blits, and clears.

use super::*;

fn solid(value: [f32; 4], count: usize) -> Vec<[f32; 4]> {
    vec![value; count]
}

#[test]
fn test_fill_and_read_texture() {
    let device = SoftwareDevice::new(64, 64);
    let texture = device.create_color_texture(2, 2).unwrap();

    device.fill_color_texture(texture, [0.25, 0.5, 0.75, 1.0]).unwrap();

    assert_eq!(
        device.read_color_texture(texture).unwrap(),
        solid([0.25, 0.5, 0.75, 1.0], 4)
    );
}

#[test]
fn test_draw_to_display_evaluates_program() {
    let device = SoftwareDevice::new(4, 4);
    let program = device.register_fragment_program(|inputs, _| {
        let value = inputs.uniforms.get("level").copied().unwrap_or(0.0);
        [value, value, value, 1.0]
    });

    device.set_uniform_f32(program, "level", 0.5).unwrap();
    device.use_program(program).unwrap();
    device.draw_fullscreen_quad().unwrap();

    assert_eq!(device.read_display(), solid([0.5, 0.5, 0.5, 1.0], 16));
}

#[test]
fn test_draw_samples_bound_texture() {
    let device = SoftwareDevice::new(4, 4);
    let input = device.create_color_texture(4, 4).unwrap();
    device.fill_color_texture(input, [0.1, 0.2, 0.3, 1.0]).unwrap();

    let framebuffer = device.create_framebuffer().unwrap();
    let output = device.create_color_texture(4, 4).unwrap();
    device.attach_color_texture(framebuffer, 0, output).unwrap();
    device.set_draw_buffers(framebuffer, 1).unwrap();

    let program = device.register_fragment_program(|inputs, _| inputs.samples[0]);
    device.use_program(program).unwrap();
    device.bind_texture(input, 0).unwrap();
    device.bind_framebuffer(framebuffer).unwrap();
    device.draw_fullscreen_quad().unwrap();

    assert_eq!(
        device.read_color_texture(output).unwrap(),
        solid([0.1, 0.2, 0.3, 1.0], 16)
    );
}

#[test]
fn test_draw_writes_every_enabled_draw_buffer() {
    let device = SoftwareDevice::new(4, 4);
    let framebuffer = device.create_framebuffer().unwrap();
    let first = device.create_color_texture(2, 2).unwrap();
    let second = device.create_color_texture(2, 2).unwrap();
    device.attach_color_texture(framebuffer, 0, first).unwrap();
    device.attach_color_texture(framebuffer, 1, second).unwrap();
    device.set_draw_buffers(framebuffer, 2).unwrap();

    let program =
        device.register_fragment_program(|_, draw_index| [draw_index as f32, 0.0, 0.0, 1.0]);
    device.use_program(program).unwrap();
    device.bind_framebuffer(framebuffer).unwrap();
    device.draw_fullscreen_quad().unwrap();

    assert_eq!(device.read_color_texture(first).unwrap(), solid([0.0, 0.0, 0.0, 1.0], 4));
    assert_eq!(device.read_color_texture(second).unwrap(), solid([1.0, 0.0, 0.0, 1.0], 4));
}

#[test]
fn test_blit_copies_across_sizes() {
    let device = SoftwareDevice::new(4, 4);

    let source_fbo = device.create_framebuffer().unwrap();
    let source = device.create_color_texture(1, 1).unwrap();
    device.attach_color_texture(source_fbo, 0, source).unwrap();
    device.fill_color_texture(source, [1.0, 0.0, 0.0, 1.0]).unwrap();

    let destination_fbo = device.create_framebuffer().unwrap();
    let destination = device.create_color_texture(2, 2).unwrap();
    device.attach_color_texture(destination_fbo, 0, destination).unwrap();

    device
        .blit_attachment(source_fbo, destination_fbo, 0, (1, 1), (2, 2), BlitFilter::Nearest)
        .unwrap();

    assert_eq!(
        device.read_color_texture(destination).unwrap(),
        solid([1.0, 0.0, 0.0, 1.0], 4)
    );
    assert_eq!(device.blit_count(), 1);
}

#[test]
fn test_blit_to_display() {
    let device = SoftwareDevice::new(2, 2);
    let framebuffer = device.create_framebuffer().unwrap();
    let source = device.create_color_texture(2, 2).unwrap();
    device.attach_color_texture(framebuffer, 0, source).unwrap();
    device.fill_color_texture(source, [0.0, 1.0, 0.0, 1.0]).unwrap();

    device.blit_to_display(framebuffer, 0, (2, 2)).unwrap();

    assert_eq!(device.read_display(), solid([0.0, 1.0, 0.0, 1.0], 4));
}

#[test]
fn test_clear_targets_bound_framebuffer_only() {
    let device = SoftwareDevice::new(2, 2);
    let framebuffer = device.create_framebuffer().unwrap();
    let texture = device.create_color_texture(2, 2).unwrap();
    device.attach_color_texture(framebuffer, 0, texture).unwrap();
    device.set_draw_buffers(framebuffer, 1).unwrap();

    device.set_clear_color(Vec4::new(0.2, 0.4, 0.6, 1.0));
    device.bind_framebuffer(framebuffer).unwrap();
    device.clear(ClearFlags::COLOR | ClearFlags::DEPTH);

    assert_eq!(
        device.read_color_texture(texture).unwrap(),
        solid([0.2, 0.4, 0.6, 1.0], 4)
    );
    // Display untouched
    assert_eq!(device.read_display(), solid([0.0, 0.0, 0.0, 0.0], 4));
}

#[test]
fn test_unknown_handles_are_rejected() {
    let device = SoftwareDevice::new(2, 2);

    assert!(device.read_color_texture(TextureId::default()).is_err());
    assert!(device.use_program(ProgramId::default()).is_err());
    assert!(device.bind_framebuffer(FramebufferId::default()).is_err());
}

#[test]
fn test_draw_without_program_fails() {
    let device = SoftwareDevice::new(2, 2);

    assert!(matches!(
        device.draw_fullscreen_quad(),
        Err(Error::InvalidConfiguration(_))
    ));
}
