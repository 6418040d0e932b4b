use serde::Serialize;

use crate::coord::Coord;
use crate::params::SNAPSHOT_SIGNAL_WEIGHT;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AgentView {
    pub loc: Coord,
    pub alive: bool,
}

/// Read-only copy of the world handed to renderers. Grids are indexed `[x][y]`.
#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub generation: usize,
    pub size_x: usize,
    pub size_y: usize,
    pub agents: Vec<AgentView>,
    pub signals: Vec<Vec<u32>>,
}

impl Snapshot {
    fn cell(&self, loc: Coord) -> Option<(usize, usize)> {
        let on_grid = loc.x >= 0
            && loc.y >= 0
            && (loc.x as usize) < self.size_x
            && (loc.y as usize) < self.size_y;
        on_grid.then(|| (loc.x as usize, loc.y as usize))
    }

    /// 1.0 where a living agent stands, plus half the signal level.
    pub fn combined_grid(&self) -> Vec<Vec<f64>> {
        let mut presence = vec![vec![0.0; self.size_y]; self.size_x];
        for agent in self.agents.iter().filter(|a| a.alive) {
            if let Some((x, y)) = self.cell(agent.loc) {
                presence[x][y] = 1.0;
            }
        }
        for (column, signal_column) in presence.iter_mut().zip(&self.signals) {
            for (cell, signal) in column.iter_mut().zip(signal_column) {
                *cell += SNAPSHOT_SIGNAL_WEIGHT * *signal as f64;
            }
        }
        presence
    }

    pub fn occupied_cells(&self) -> usize {
        let mut cells: Vec<(usize, usize)> = self
            .agents
            .iter()
            .filter(|a| a.alive)
            .filter_map(|a| self.cell(a.loc))
            .collect();
        cells.sort_unstable();
        cells.dedup();
        cells.len()
    }

    pub fn peak(&self) -> f64 {
        self.combined_grid()
            .iter()
            .flatten()
            .copied()
            .fold(0.0, f64::max)
    }
}
