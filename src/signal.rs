use crate::coord::Coord;

/// Per-cell scalar that agents deposit into and that decays by one each tick.
/// Indexed `[x][y]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignalLayer {
    grid: Vec<Vec<u32>>,
    size_x: usize,
    size_y: usize,
}

impl SignalLayer {
    pub fn new(size_x: usize, size_y: usize) -> SignalLayer {
        SignalLayer {
            grid: vec![vec![0; size_y]; size_x],
            size_x,
            size_y,
        }
    }

    pub fn size_x(&self) -> usize {
        self.size_x
    }

    pub fn size_y(&self) -> usize {
        self.size_y
    }

    pub fn contains(&self, loc: Coord) -> bool {
        loc.x >= 0
            && loc.y >= 0
            && (loc.x as usize) < self.size_x
            && (loc.y as usize) < self.size_y
    }

    /// `None` off the grid.
    pub fn get(&self, loc: Coord) -> Option<u32> {
        if self.contains(loc) {
            Some(self.grid[loc.x as usize][loc.y as usize])
        } else {
            None
        }
    }

    /// Returns false (and does nothing) when `loc` is off the grid.
    pub fn increment(&mut self, loc: Coord) -> bool {
        if !self.contains(loc) {
            return false;
        }
        let cell = &mut self.grid[loc.x as usize][loc.y as usize];
        *cell = cell.saturating_add(1);
        true
    }

    pub fn fade(&mut self) {
        for column in self.grid.iter_mut() {
            for cell in column.iter_mut() {
                *cell = cell.saturating_sub(1);
            }
        }
    }

    pub fn grid(&self) -> &[Vec<u32>] {
        &self.grid
    }

    pub fn total(&self) -> u64 {
        self.grid.iter().flatten().map(|v| *v as u64).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let layer = SignalLayer::new(4, 3);
        assert_eq!(layer.grid().len(), 4);
        assert!(layer.grid().iter().all(|col| col.len() == 3));
        assert_eq!(layer.total(), 0);
    }

    #[test]
    fn increment_then_fade_floors_at_zero() {
        let mut layer = SignalLayer::new(5, 5);
        let loc = Coord::new(2, 3);
        for _ in 0..3 {
            layer.increment(loc);
        }
        layer.increment(loc);
        for n in 1..=6u32 {
            layer.fade();
            assert_eq!(layer.get(loc), Some(4u32.saturating_sub(n)));
        }
        assert_eq!(layer.total(), 0);
    }

    #[test]
    fn fade_on_empty_grid_stays_zero() {
        let mut layer = SignalLayer::new(2, 2);
        layer.fade();
        assert_eq!(layer.total(), 0);
    }

    #[test]
    fn off_grid_access_is_neutral() {
        let mut layer = SignalLayer::new(3, 3);
        assert_eq!(layer.get(Coord::new(-1, 0)), None);
        assert_eq!(layer.get(Coord::new(0, 3)), None);
        assert!(!layer.increment(Coord::new(3, 1)));
        assert_eq!(layer.total(), 0);
    }
}
