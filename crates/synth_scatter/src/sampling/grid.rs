//! Background grid for constant-time separation queries.
use glam::Vec2;

/// Largest number of cells a grid may allocate (about 200 MB of cell storage).
pub const MAX_GRID_CELLS: usize = 1 << 24;

/// Cell counts along x and y for `extent` at `min_distance`, or `None` when the grid would
/// exceed [`MAX_GRID_CELLS`] or the inputs cannot form a grid.
pub fn grid_dimensions(extent: Vec2, min_distance: f32) -> Option<(usize, usize)> {
    let cell_size = min_distance / std::f32::consts::SQRT_2;
    if !(cell_size.is_finite() && cell_size > 0.0) || !extent.is_finite() {
        return None;
    }
    let axis = |length: f32| {
        let cells = (length / cell_size).ceil();
        (cells.is_finite() && cells >= 0.0 && cells < MAX_GRID_CELLS as f32)
            .then(|| cells as usize + 1)
    };
    let (width, height) = (axis(extent.x)?, axis(extent.y)?);
    width
        .checked_mul(height)
        .filter(|&cells| cells <= MAX_GRID_CELLS)
        .map(|_| (width, height))
}

/// Uniform grid over `[0, extent.x) x [0, extent.y)` with cell size `min_distance / sqrt(2)`.
///
/// A cell's diagonal equals the minimum distance, so each cell holds at most one accepted
/// point and any conflicting neighbor lies within two cells of a candidate.
#[derive(Debug, Clone)]
pub struct SeparationGrid {
    extent: Vec2,
    min_distance_squared: f32,
    cell_size: f32,
    width: usize,
    height: usize,
    cells: Vec<Option<Vec2>>,
}

impl SeparationGrid {
    /// Returns `None` when [`grid_dimensions`] rejects the inputs.
    pub fn new(extent: Vec2, min_distance: f32) -> Option<Self> {
        let (width, height) = grid_dimensions(extent, min_distance)?;

        Some(Self {
            extent,
            min_distance_squared: min_distance * min_distance,
            cell_size: min_distance / std::f32::consts::SQRT_2,
            width,
            height,
            cells: vec![None; width * height],
        })
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    #[inline]
    fn cell_of(&self, point: Vec2) -> (usize, usize) {
        let x = ((point.x / self.cell_size).floor() as isize).clamp(0, self.width as isize - 1);
        let y = ((point.y / self.cell_size).floor() as isize).clamp(0, self.height as isize - 1);
        (x as usize, y as usize)
    }

    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.x < self.extent.x && point.y >= 0.0 && point.y < self.extent.y
    }

    /// True when `point` is inside the domain and no stored point is closer than the minimum distance.
    pub fn accepts(&self, point: Vec2) -> bool {
        if !self.contains(point) {
            return false;
        }

        let (gx, gy) = self.cell_of(point);
        let start_x = gx.saturating_sub(2);
        let end_x = (gx + 3).min(self.width);
        let start_y = gy.saturating_sub(2);
        let end_y = (gy + 3).min(self.height);

        for y in start_y..end_y {
            for x in start_x..end_x {
                if let Some(existing) = self.cells[self.index(x, y)] {
                    if point.distance_squared(existing) < self.min_distance_squared {
                        return false;
                    }
                }
            }
        }

        true
    }

    pub fn insert(&mut self, point: Vec2) {
        let (gx, gy) = self.cell_of(point);
        let idx = self.index(gx, gy);
        debug_assert!(self.cells[idx].is_none(), "cell already occupied");
        self.cells[idx] = Some(point);
    }
}
