use super::{Chunk, Color};

/// Receiver for immediate-mode cube draws. The Vulkan backend batches them into one
/// instanced draw; tests record them.
pub trait CubeSink {
    fn draw_cube(&mut self, position: uv::Vec3, size: uv::Vec3, color: Color);
}

impl Chunk {
    /// Emits one unit cube per occupied voxel, in storage order, with the chunk centered on
    /// the origin.
    pub fn draw(&self, sink: &mut impl CubeSink) {
        let offset = uv::Vec3::new(
            (Self::WIDTH / 2) as f32,
            (Self::HEIGHT / 2) as f32,
            (Self::WIDTH / 2) as f32,
        );
        for (index, kind) in self.iter_occupied() {
            let position = uv::Vec3::new(index.x() as f32, index.y() as f32, index.z() as f32);
            sink.draw_cube(position - offset, uv::Vec3::one(), kind.color())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::VoxelKind;

    #[derive(Default)]
    struct Recorder {
        cubes: Vec<(uv::Vec3, uv::Vec3, Color)>,
    }

    impl CubeSink for Recorder {
        fn draw_cube(&mut self, position: uv::Vec3, size: uv::Vec3, color: Color) {
            self.cubes.push((position, size, color))
        }
    }

    fn record(chunk: &Chunk) -> Vec<(uv::Vec3, uv::Vec3, Color)> {
        let mut recorder = Recorder::default();
        chunk.draw(&mut recorder);
        recorder.cubes
    }

    #[test]
    fn empty_chunk_draws_nothing() {
        assert!(record(&Chunk::new()).is_empty());
    }

    #[test]
    fn full_chunk_draws_every_voxel() {
        let mut chunk = Chunk::new();
        chunk.fill(VoxelKind::Stone);
        let cubes = record(&chunk);
        assert_eq!(cubes.len(), 4096);
        assert!(cubes
            .iter()
            .all(|(_, size, color)| *size == uv::Vec3::one() && *color == Color::GRAY));
    }

    #[test]
    fn cubes_are_centered_on_origin() {
        let mut chunk = Chunk::new();
        chunk.set_voxel(0, 0, 0, VoxelKind::Sand);
        chunk.set_voxel(15, 15, 15, VoxelKind::Water);
        chunk.set_voxel(8, 3, 12, VoxelKind::Dirt);
        let cubes = record(&chunk);
        assert_eq!(
            cubes,
            vec![
                (uv::Vec3::new(-8.0, -8.0, -8.0), uv::Vec3::one(), Color::BEIGE),
                (uv::Vec3::new(0.0, -5.0, 4.0), uv::Vec3::one(), Color::BROWN),
                (uv::Vec3::new(7.0, 7.0, 7.0), uv::Vec3::one(), Color::BLUE),
            ]
        );
    }

    #[test]
    fn one_draw_per_occupied_voxel() {
        let mut chunk = Chunk::new();
        chunk.fill_box((0, 0, 0), (15, 7, 15), VoxelKind::Dirt);
        chunk.fill_box((0, 7, 0), (15, 7, 15), VoxelKind::Grass);
        let cubes = record(&chunk);
        assert_eq!(cubes.len(), chunk.occupied());
        let grass = cubes.iter().filter(|(_, _, color)| *color == Color::GREEN).count();
        let dirt = cubes.iter().filter(|(_, _, color)| *color == Color::BROWN).count();
        assert_eq!((dirt, grass), (1792, 256));
        assert!(cubes
            .iter()
            .filter(|(_, _, color)| *color == Color::GREEN)
            .all(|(position, _, _)| position.y == -1.0));
    }
}
