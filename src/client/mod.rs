mod camera;
mod frame;
mod window;

use crate::vk::Instance;
use crate::voxel::{Chunk, Color, VoxelKind};
use crate::*;

const WINDOW_SIZE: (u32, u32) = (800, 450);
const WINDOW_TITLE: &str = "voxel grid demo";
const TARGET_FPS: u32 = 60;
const BACKGROUND: Color = Color::RAYWHITE;

/// Dirt up to the middle layer, with a grass layer on top of it.
pub fn build_chunk() -> Chunk {
    let mut chunk = Chunk::new();
    let far = (Chunk::WIDTH - 1) as f32;
    let middle = ((Chunk::HEIGHT - 1) / 2) as f32;
    chunk.fill_box_points(uv::Vec3::zero(), uv::Vec3::new(far, middle, far), VoxelKind::Dirt);
    chunk.fill_box_points(
        uv::Vec3::new(0.0, middle, 0.0),
        uv::Vec3::new(far, middle, far),
        VoxelKind::Grass,
    );
    log::info!(
        "chunk populated: {} dirt, {} grass, {} occupied",
        chunk.count(VoxelKind::Dirt),
        chunk.count(VoxelKind::Grass),
        chunk.occupied()
    );
    chunk
}

pub fn run() -> ! {
    let event_loop = winit::event_loop::EventLoop::new();
    let window = window::ClientWindow::new(&event_loop, WINDOW_SIZE, WINDOW_TITLE);
    let chunk = build_chunk();

    let render_instance = vk::WindowedInstance::new(window.window(), cfg!(debug_assertions));
    let mut render_surface =
        vk::Swapchain::new(render_instance.clone(), window.size().into(), BACKGROUND);
    let mut cube_renderer = vk::CubeRenderer::new(
        render_instance.clone(),
        &render_surface,
        Chunk::VOLUME as usize,
    );
    let mut batch = vk::CubeBatch::with_capacity(Chunk::VOLUME as usize);

    let mut camera = camera::ClientCamera::new(uv::Vec3::new(4.0, 4.0, 4.0), uv::Vec3::zero(), 60.0);

    window.run(event_loop, TARGET_FPS, move |window, state| {
        if state.quit() {
            render_instance.wait_idle();
            return;
        }
        camera.update(state);
        log::trace!("{:?}", camera);

        batch.clear();
        chunk.draw(&mut batch);

        let rendered = render_surface.render(|frame| {
            cube_renderer.render(frame, &batch, &camera.camera());
        });
        if !rendered {
            log::info!("swapchain out of date, rebuilding");
            render_instance.wait_idle();
            render_surface.rebuild(window.size().into());
            cube_renderer.rebuild(&render_surface);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_chunk_has_dirt_under_grass() {
        let chunk = build_chunk();
        assert_eq!(chunk.count(VoxelKind::Dirt), 16 * 16 * 7);
        assert_eq!(chunk.count(VoxelKind::Grass), 16 * 16);
        assert_eq!(chunk.occupied(), 2048);
        for y in 0..16 {
            let expected = match y {
                0..=6 => VoxelKind::Dirt,
                7 => VoxelKind::Grass,
                _ => VoxelKind::Empty,
            };
            assert_eq!(chunk.get_voxel(3, y, 11), expected);
        }
    }
}
