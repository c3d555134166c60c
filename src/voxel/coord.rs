use super::Chunk;
use num_traits::ToPrimitive;

/// Flat position of a voxel inside a [`Chunk`].
///
/// Layout is `x + z * WIDTH + y * WIDTH * WIDTH`, so x varies fastest and y slowest.
/// Every constructor validates its input, so holding a `ChunkIndex` means holding an
/// in-bounds slot.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct ChunkIndex(u32);

impl ChunkIndex {
    pub fn new(x: i32, y: i32, z: i32) -> Option<Self> {
        let (x, y, z) = (x.to_u32()?, y.to_u32()?, z.to_u32()?);
        (x < Chunk::WIDTH && y < Chunk::HEIGHT && z < Chunk::WIDTH)
            .then(|| Self::new_unchecked(x, y, z))
    }

    pub fn from_flat(index: usize) -> Option<Self> {
        let index = index.to_u32()?;
        (index < Chunk::VOLUME).then(|| Self(index))
    }

    /// Panicking form of [`ChunkIndex::new`].
    #[track_caller]
    pub fn at(x: i32, y: i32, z: i32) -> Self {
        match Self::new(x, y, z) {
            Some(index) => index,
            None => panic!(
                "voxel coordinate ({}, {}, {}) out of bounds for {}x{}x{} chunk",
                x,
                y,
                z,
                Chunk::WIDTH,
                Chunk::HEIGHT,
                Chunk::WIDTH
            ),
        }
    }

    /// Panicking form of [`ChunkIndex::from_flat`].
    #[track_caller]
    pub fn at_flat(index: usize) -> Self {
        match Self::from_flat(index) {
            Some(index) => index,
            None => panic!(
                "flat voxel index {} out of bounds for chunk of {} voxels",
                index,
                Chunk::VOLUME
            ),
        }
    }

    pub(in crate::voxel) fn new_unchecked(x: u32, y: u32, z: u32) -> Self {
        debug_assert!(x < Chunk::WIDTH && y < Chunk::HEIGHT && z < Chunk::WIDTH);
        Self(y << Chunk::BITS2 | z << Chunk::BITS | x)
    }

    pub fn x(&self) -> u32 {
        self.0 & Chunk::BIT_MASK
    }

    pub fn y(&self) -> u32 {
        self.0 >> Chunk::BITS2
    }

    pub fn z(&self) -> u32 {
        (self.0 >> Chunk::BITS) & Chunk::BIT_MASK
    }

    pub fn flat(&self) -> usize {
        self.0 as usize
    }

    /// All indices in storage order: y outermost, then z, then x.
    pub fn iterate() -> impl Iterator<Item = Self> {
        (0..Chunk::VOLUME).map(Self)
    }
}

impl std::fmt::Debug for ChunkIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkIndex")
            .field("x", &self.x())
            .field("y", &self.y())
            .field("z", &self.z())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_index_matches_layout_formula() {
        let (w, h) = (Chunk::WIDTH as i32, Chunk::HEIGHT as i32);
        for y in 0..h {
            for z in 0..w {
                for x in 0..w {
                    let index = ChunkIndex::new(x, y, z).unwrap();
                    assert_eq!(index.flat(), (x + z * w + y * w * w) as usize);
                    assert_eq!((index.x(), index.y(), index.z()), (x as u32, y as u32, z as u32));
                }
            }
        }
    }

    #[test]
    fn iterate_is_storage_order() {
        let mut expected = Vec::new();
        for y in 0..Chunk::HEIGHT {
            for z in 0..Chunk::WIDTH {
                for x in 0..Chunk::WIDTH {
                    expected.push((x, y, z));
                }
            }
        }
        let actual: Vec<_> = ChunkIndex::iterate()
            .map(|index| (index.x(), index.y(), index.z()))
            .collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let w = Chunk::WIDTH as i32;
        let h = Chunk::HEIGHT as i32;
        assert!(ChunkIndex::new(-1, 0, 0).is_none());
        assert!(ChunkIndex::new(0, -1, 0).is_none());
        assert!(ChunkIndex::new(0, 0, -1).is_none());
        assert!(ChunkIndex::new(w, 0, 0).is_none());
        assert!(ChunkIndex::new(0, h, 0).is_none());
        assert!(ChunkIndex::new(0, 0, w).is_none());
        assert!(ChunkIndex::new(w - 1, h - 1, w - 1).is_some());
    }

    #[test]
    fn from_flat_bounds() {
        assert_eq!(ChunkIndex::from_flat(0), ChunkIndex::new(0, 0, 0));
        let last = Chunk::VOLUME as usize - 1;
        assert_eq!(ChunkIndex::from_flat(last).map(|index| index.flat()), Some(last));
        assert!(ChunkIndex::from_flat(Chunk::VOLUME as usize).is_none());
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn at_panics_on_negative_coordinate() {
        ChunkIndex::at(0, -1, 0);
    }

    #[test]
    #[should_panic(expected = "flat voxel index 4096")]
    fn at_flat_panics_past_end() {
        ChunkIndex::at_flat(4096);
    }
}
