pub use chunk::Chunk;
pub use coord::ChunkIndex;
pub use draw::CubeSink;

mod chunk;
mod coord;
mod draw;

#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum VoxelKind {
    Empty = 0,
    Dirt = 1,
    Grass = 2,
    Stone = 3,
    Sand = 4,
    Water = 5,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl VoxelKind {
    pub const COUNT: usize = 6;

    pub fn iterate() -> impl Iterator<Item = Self> {
        [
            Self::Empty,
            Self::Dirt,
            Self::Grass,
            Self::Stone,
            Self::Sand,
            Self::Water,
        ]
        .iter()
        .cloned()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::Empty
    }

    pub fn color(&self) -> Color {
        match *self {
            VoxelKind::Empty => Color::BLANK,
            VoxelKind::Dirt => Color::BROWN,
            VoxelKind::Grass => Color::GREEN,
            VoxelKind::Stone => Color::GRAY,
            VoxelKind::Sand => Color::BEIGE,
            VoxelKind::Water => Color::BLUE,
        }
    }
}

impl Default for VoxelKind {
    fn default() -> Self {
        Self::Empty
    }
}

impl Color {
    pub const BLANK: Self = Self::new(0, 0, 0, 0);
    pub const BROWN: Self = Self::new(127, 106, 79, 255);
    pub const GREEN: Self = Self::new(0, 228, 48, 255);
    pub const GRAY: Self = Self::new(130, 130, 130, 255);
    pub const BEIGE: Self = Self::new(211, 176, 131, 255);
    pub const BLUE: Self = Self::new(0, 121, 241, 255);
    pub const RAYWHITE: Self = Self::new(245, 245, 245, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_f32(&self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }

    /// Approximate linear-light components, for render targets that encode sRGB on write.
    pub fn to_linear(&self) -> [f32; 4] {
        let [r, g, b, a] = self.to_f32();
        let decode = |c: f32| c.powf(2.2);
        [decode(r), decode(g), decode(b), a]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_follow_declaration_order() {
        for (ordinal, kind) in VoxelKind::iterate().enumerate() {
            assert_eq!(kind as usize, ordinal);
        }
        assert_eq!(VoxelKind::iterate().count(), VoxelKind::COUNT);
    }

    #[test]
    fn empty_is_default_and_only_empty_kind() {
        assert_eq!(VoxelKind::default(), VoxelKind::Empty);
        let empties = VoxelKind::iterate().filter(VoxelKind::is_empty).count();
        assert_eq!(empties, 1);
    }

    #[test]
    fn only_empty_is_transparent() {
        for kind in VoxelKind::iterate() {
            assert_eq!(kind.color().a == 0, kind.is_empty(), "{:?}", kind);
        }
    }

    #[test]
    fn color_to_f32_normalizes() {
        assert_eq!(Color::RAYWHITE.to_f32()[3], 1.0);
        assert_eq!(Color::BLANK.to_f32(), [0.0; 4]);
        assert!((Color::BROWN.to_f32()[0] - 127.0 / 255.0).abs() < f32::EPSILON);
    }

    #[test]
    fn linear_keeps_extremes_and_alpha() {
        assert_eq!(Color::new(255, 0, 255, 128).to_linear()[..3], [1.0, 0.0, 1.0]);
        assert_eq!(Color::BLUE.to_linear()[3], 1.0);
        assert!(Color::GRAY.to_linear()[0] < Color::GRAY.to_f32()[0]);
    }
}
