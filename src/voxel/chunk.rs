use super::{ChunkIndex, VoxelKind};

/// Dense, fixed-size block of voxels.
///
/// Out-of-range coordinates and flat indices panic; bounds are checked before anything is
/// written, so a rejected [`Chunk::fill_box`] leaves the chunk untouched.
pub struct Chunk {
    voxels: Box<[VoxelKind; Self::VOLUME as usize]>,
}

impl Chunk {
    pub const WIDTH: u32 = 16;
    pub const HEIGHT: u32 = 16;
    pub const AREA: u32 = Self::WIDTH * Self::WIDTH;
    pub const VOLUME: u32 = Self::AREA * Self::HEIGHT;
    pub const BITS: u32 = 4;
    pub const BITS2: u32 = 8;
    pub const BIT_MASK: u32 = 0xF;

    pub fn new() -> Self {
        Self {
            voxels: Box::new([VoxelKind::Empty; Self::VOLUME as usize]),
        }
    }

    #[track_caller]
    pub fn get_voxel(&self, x: i32, y: i32, z: i32) -> VoxelKind {
        self[ChunkIndex::at(x, y, z)]
    }

    #[track_caller]
    pub fn get_voxel_flat(&self, index: usize) -> VoxelKind {
        self[ChunkIndex::at_flat(index)]
    }

    #[track_caller]
    pub fn set_voxel(&mut self, x: i32, y: i32, z: i32, kind: VoxelKind) {
        self[ChunkIndex::at(x, y, z)] = kind
    }

    #[track_caller]
    pub fn set_voxel_flat(&mut self, index: usize, kind: VoxelKind) {
        self[ChunkIndex::at_flat(index)] = kind
    }

    pub fn fill(&mut self, kind: VoxelKind) {
        self.voxels.fill(kind)
    }

    /// Sets every voxel in the inclusive box spanned by the two corners. Corners may be
    /// given in any order.
    #[track_caller]
    pub fn fill_box(&mut self, (x1, y1, z1): (i32, i32, i32), (x2, y2, z2): (i32, i32, i32), kind: VoxelKind) {
        let min = ChunkIndex::at(x1.min(x2), y1.min(y2), z1.min(z2));
        let max = ChunkIndex::at(x1.max(x2), y1.max(y2), z1.max(z2));
        log::trace!("fill_box {:?}..={:?} with {:?}", min, max, kind);

        // y, z, x matches the storage layout, so each x run is one contiguous slice.
        for y in min.y()..=max.y() {
            for z in min.z()..=max.z() {
                let start = ChunkIndex::new_unchecked(min.x(), y, z).flat();
                let end = ChunkIndex::new_unchecked(max.x(), y, z).flat();
                self.voxels[start..=end].fill(kind)
            }
        }
    }

    /// Float-corner form of [`Chunk::fill_box`]. Each component is truncated toward zero,
    /// which does not clamp: a corner below -1.0 still lands out of bounds.
    #[track_caller]
    pub fn fill_box_points(&mut self, a: uv::Vec3, b: uv::Vec3, kind: VoxelKind) {
        self.fill_box(
            (a.x as i32, a.y as i32, a.z as i32),
            (b.x as i32, b.y as i32, b.z as i32),
            kind,
        )
    }

    pub fn count(&self, kind: VoxelKind) -> usize {
        self.voxels.iter().filter(|voxel| **voxel == kind).count()
    }

    pub fn occupied(&self) -> usize {
        self.voxels.iter().filter(|voxel| !voxel.is_empty()).count()
    }

    /// Occupied voxels in storage order.
    pub fn iter_occupied(&self) -> impl Iterator<Item = (ChunkIndex, VoxelKind)> + '_ {
        ChunkIndex::iterate()
            .map(move |index| (index, self[index]))
            .filter(|(_, kind)| !kind.is_empty())
    }
}

impl Default for Chunk {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<ChunkIndex> for Chunk {
    type Output = VoxelKind;

    fn index(&self, index: ChunkIndex) -> &Self::Output {
        &self.voxels[index.flat()]
    }
}

impl std::ops::IndexMut<ChunkIndex> for Chunk {
    fn index_mut(&mut self, index: ChunkIndex) -> &mut Self::Output {
        &mut self.voxels[index.flat()]
    }
}

impl std::fmt::Debug for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chunk")
            .field("occupied", &self.occupied())
            .finish()
    }
}
