// Candidate end-state lattice
//
// 3D grid over (lateral offset, terminal speed, horizon duration) held as a
// flat arena of cells addressed by (i, j, k). Cells carry the cheap fixed and
// heuristic cost terms at construction; the full trajectory and its jerk cost
// are filled in lazily by the planner on first visit.

use itertools::iproduct;

use crate::frenet::{FrenetState, FrenetTrajectory};
use crate::planner::Setting;

/// (lateral bin, speed bin, horizon bin)
pub type LatticeIndex = [usize; 3];

/// One lattice node
#[derive(Debug, Clone)]
pub struct CandidateCell {
    pub end_state: FrenetState,
    /// Lattice-position-dependent cost, known before synthesis
    pub fix_cost: f64,
    /// Cheap estimate of the not-yet-known dynamic cost
    pub heuristic_cost: f64,
    /// Included in the search frontier (monotonic, set once)
    pub visited: bool,
    /// Full trajectory synthesized (monotonic, set once)
    pub materialized: bool,
    /// fix_cost + jerk cost; valid once materialized
    pub final_cost: f64,
    /// Owned by the cell until popped into the validation queue
    pub trajectory: Option<FrenetTrajectory>,
}

/// Flat arena of candidate cells for one planning cycle
#[derive(Debug, Clone)]
pub struct CandidateLattice {
    cells: Vec<CandidateCell>,
    sizes: [usize; 3],
    start_index: LatticeIndex,
}

impl CandidateLattice {
    /// Sample all end states and their fixed/heuristic costs.
    ///
    /// Lateral bins span [right_bound, left_bound], speed bins
    /// [lowest_speed, highest_speed], horizon bins [min_t, max_t];
    /// singleton dimensions pin to the lower end of their range.
    pub fn new(
        settings: &Setting,
        start_state: &FrenetState,
        left_bound: f64,
        right_bound: f64,
        current_speed: f64,
    ) -> Self {
        let sizes = [settings.num_width, settings.num_speed, settings.num_t];

        let span = |low: f64, high: f64, n: usize| {
            if n > 1 { (high - low) / (n - 1) as f64 } else { 0.0 }
        };
        let delta_width = span(right_bound, left_bound, settings.num_width);
        let delta_v = span(settings.lowest_speed, settings.highest_speed, settings.num_speed);
        let delta_t = span(settings.min_t, settings.max_t, settings.num_t);

        let lat_norm = (left_bound - settings.center_offset)
            .powi(2)
            .max((right_bound - settings.center_offset).powi(2));

        let mut cells = Vec::with_capacity(sizes[0] * sizes[1] * sizes[2]);
        let mut min_cost = f64::MAX;
        let mut start_index = [0, 0, 0];

        for (i, j, k) in iproduct!(0..sizes[0], 0..sizes[1], 0..sizes[2]) {
            let d = right_bound + i as f64 * delta_width;
            let lat_cost = if lat_norm > 0.0 {
                (d - settings.center_offset).powi(2) / lat_norm
            } else {
                0.0
            };

            let v = settings.lowest_speed + j as f64 * delta_v;
            let speed_cost =
                (settings.highest_speed - v).powi(2) + 0.5 * (current_speed - v).powi(2);

            let t = settings.min_t + k as f64 * delta_t;
            let time_cost = 1.0 - t / settings.max_t;

            let fix_cost = settings.k_lat * settings.k_diff * lat_cost
                + settings.k_lon * (settings.k_time * time_cost + settings.k_diff * speed_cost);
            let heuristic_cost =
                settings.k_lat * settings.k_diff * (start_state.d - d).powi(2);

            // cheapest estimated cell seeds the search; first one wins ties
            let est_cost = fix_cost + heuristic_cost;
            if est_cost < min_cost {
                min_cost = est_cost;
                start_index = [i, j, k];
            }

            cells.push(CandidateCell {
                end_state: FrenetState::new(0.0, v, 0.0, d, 0.0, 0.0, t),
                fix_cost,
                heuristic_cost,
                visited: false,
                materialized: false,
                final_cost: 0.0,
                trajectory: None,
            });
        }

        CandidateLattice { cells, sizes, start_index }
    }

    pub fn sizes(&self) -> [usize; 3] {
        self.sizes
    }

    pub fn start_index(&self) -> LatticeIndex {
        self.start_index
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn linear_index(&self, index: LatticeIndex) -> usize {
        (index[0] * self.sizes[1] + index[1]) * self.sizes[2] + index[2]
    }

    pub fn cell(&self, index: LatticeIndex) -> &CandidateCell {
        &self.cells[self.linear_index(index)]
    }

    pub fn cell_mut(&mut self, index: LatticeIndex) -> &mut CandidateCell {
        let linear = self.linear_index(index);
        &mut self.cells[linear]
    }

    /// Move a materialized trajectory out of its cell (single consumer)
    pub fn take_trajectory(&mut self, linear: usize) -> Option<FrenetTrajectory> {
        self.cells[linear].trajectory.take()
    }

    pub fn cells(&self) -> &[CandidateCell] {
        &self.cells
    }
}
