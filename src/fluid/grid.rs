use std::fmt;

use glam::DVec2;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::config::POSITION_EPS;
use crate::core::GrainStore;
use crate::error::{Result, SimError};
use crate::utils::math::approx_eq;

/// The fluid layer a grid describes. Ocean and atmosphere grids share the
/// same geometry and interpolation machinery and differ only in density and
/// drag coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FluidLayer {
    Ocean,
    Atmosphere,
}

impl fmt::Display for FluidLayer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Ocean => write!(f, "ocean"),
            Self::Atmosphere => write!(f, "atmosphere"),
        }
    }
}

/// Boundary condition on one side of a fluid grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoundaryCondition {
    /// Grains cannot leave through this side; out-of-domain positions are
    /// clamped to the edge cell during binning.
    #[default]
    Impermeable,
    /// Cell indices wrap around to the opposite side.
    Periodic,
    /// Open boundary; binning clamps like the impermeable case.
    Open,
}

/// Per-side boundary conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoundaryConditions {
    pub west: BoundaryCondition,
    pub east: BoundaryCondition,
    pub south: BoundaryCondition,
    pub north: BoundaryCondition,
}

impl BoundaryConditions {
    /// Periodic in x, impermeable in y; the common channel configuration.
    pub fn periodic_x() -> Self {
        Self {
            west: BoundaryCondition::Periodic,
            east: BoundaryCondition::Periodic,
            ..Self::default()
        }
    }

    /// Periodic on all four sides.
    pub fn periodic() -> Self {
        Self {
            west: BoundaryCondition::Periodic,
            east: BoundaryCondition::Periodic,
            south: BoundaryCondition::Periodic,
            north: BoundaryCondition::Periodic,
        }
    }
}

/// Regular rectilinear velocity grid for one fluid layer.
///
/// Velocity components are stored at cell corners, one flat
/// `(nx + 1) · (ny + 1)` array per time sample; the fields are read-only
/// inputs to the engine and are replaced wholesale between runs by whatever
/// ingests the external fluid-model output. The per-cell grain lists are
/// scratch state rebuilt every step by [`FluidGrid::sort_grains`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FluidGrid {
    pub nx: usize,
    pub ny: usize,
    pub origin: DVec2,
    pub dx: f64,
    pub dy: f64,
    /// Corner x coordinates, row-major `(nx + 1) · (ny + 1)`.
    pub xq: Vec<f64>,
    /// Corner y coordinates, same layout as `xq`.
    pub yq: Vec<f64>,
    /// Cell-center x coordinates, row-major `nx · ny`.
    pub xh: Vec<f64>,
    /// Cell-center y coordinates, same layout as `xh`.
    pub yh: Vec<f64>,
    /// Time samples the velocity fields are stored at.
    pub time: Vec<f64>,
    /// Corner x velocity, one array per time sample.
    pub u: Vec<Vec<f64>>,
    /// Corner y velocity, one array per time sample.
    pub v: Vec<Vec<f64>>,
    pub bc: BoundaryConditions,
    /// Grain indices per cell, row-major `nx · ny`; rebuilt each step.
    #[serde(skip)]
    pub cell_lists: Vec<Vec<usize>>,
}

impl FluidGrid {
    /// Creates a still-water grid of `nx × ny` cells spanning
    /// `length_x × length_y` with its south-west corner at the origin of
    /// the coordinate system. One zero-velocity time sample at t = 0.
    pub fn regular(nx: usize, ny: usize, length_x: f64, length_y: f64) -> Self {
        Self::regular_at(DVec2::ZERO, nx, ny, length_x, length_y)
    }

    /// Like [`FluidGrid::regular`] with an explicit south-west corner.
    pub fn regular_at(origin: DVec2, nx: usize, ny: usize, length_x: f64, length_y: f64) -> Self {
        assert!(nx > 0 && ny > 0, "grid needs at least one cell per axis");
        let dx = length_x / nx as f64;
        let dy = length_y / ny as f64;

        let mut xq = Vec::with_capacity((nx + 1) * (ny + 1));
        let mut yq = Vec::with_capacity((nx + 1) * (ny + 1));
        for j in 0..=ny {
            for i in 0..=nx {
                xq.push(origin.x + i as f64 * dx);
                yq.push(origin.y + j as f64 * dy);
            }
        }

        let mut xh = Vec::with_capacity(nx * ny);
        let mut yh = Vec::with_capacity(nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                xh.push(origin.x + (i as f64 + 0.5) * dx);
                yh.push(origin.y + (j as f64 + 0.5) * dy);
            }
        }

        let corners = (nx + 1) * (ny + 1);
        Self {
            nx,
            ny,
            origin,
            dx,
            dy,
            xq,
            yq,
            xh,
            yh,
            time: vec![0.0],
            u: vec![vec![0.0; corners]],
            v: vec![vec![0.0; corners]],
            bc: BoundaryConditions::default(),
            cell_lists: vec![Vec::new(); nx * ny],
        }
    }

    #[inline]
    pub fn corner_index(&self, i: usize, j: usize) -> usize {
        j * (self.nx + 1) + i
    }

    #[inline]
    pub fn cell_index(&self, i: usize, j: usize) -> usize {
        j * self.nx + i
    }

    /// Replaces the time-indexed velocity fields, checking component shapes
    /// against the grid geometry and each other.
    pub fn set_velocity_samples(
        &mut self,
        time: Vec<f64>,
        u: Vec<Vec<f64>>,
        v: Vec<Vec<f64>>,
    ) -> Result<()> {
        if u.len() != time.len() || v.len() != time.len() {
            return Err(SimError::FieldShapeMismatch {
                expected: time.len(),
                actual: u.len().max(v.len()),
            });
        }
        let corners = (self.nx + 1) * (self.ny + 1);
        for sample in u.iter().chain(v.iter()) {
            if sample.len() != corners {
                return Err(SimError::FieldShapeMismatch {
                    expected: corners,
                    actual: sample.len(),
                });
            }
        }
        self.time = time;
        self.u = u;
        self.v = v;
        Ok(())
    }

    /// Sets every corner of every time sample to one constant velocity.
    pub fn set_uniform_velocity(&mut self, velocity: DVec2) {
        for sample in &mut self.u {
            sample.fill(velocity.x);
        }
        for sample in &mut self.v {
            sample.fill(velocity.y);
        }
    }

    /// Whether this grid shares its horizontal cell geometry with `other`,
    /// enabling cell-mapping reuse between collocated ocean and atmosphere
    /// grids.
    pub fn collocated_with(&self, other: &FluidGrid) -> bool {
        self.nx == other.nx
            && self.ny == other.ny
            && self
                .xq
                .iter()
                .zip(&other.xq)
                .all(|(a, b)| approx_eq(*a, *b, POSITION_EPS))
            && self
                .yq
                .iter()
                .zip(&other.yq)
                .all(|(a, b)| approx_eq(*a, *b, POSITION_EPS))
    }

    /// Bins a coordinate along one axis, wrapping on periodic sides and
    /// clamping (with a warning) on impermeable/open sides.
    fn bin_axis(
        value: f64,
        origin: f64,
        spacing: f64,
        cells: usize,
        low_bc: BoundaryCondition,
        high_bc: BoundaryCondition,
        axis: &str,
    ) -> usize {
        let raw = ((value - origin) / spacing).floor() as i64;
        let n = cells as i64;
        if raw >= 0 && raw < n {
            return raw as usize;
        }
        let crossed = if raw < 0 { low_bc } else { high_bc };
        if crossed == BoundaryCondition::Periodic {
            raw.rem_euclid(n) as usize
        } else {
            warn!("grain position outside grid along {axis} (bin {raw}), clamping to edge cell");
            raw.clamp(0, n - 1) as usize
        }
    }

    /// Cell containing `pos`, honoring the per-side boundary conditions.
    pub fn cell_containing_point(&self, pos: DVec2) -> (usize, usize) {
        let i = Self::bin_axis(
            pos.x,
            self.origin.x,
            self.dx,
            self.nx,
            self.bc.west,
            self.bc.east,
            "x",
        );
        let j = Self::bin_axis(
            pos.y,
            self.origin.y,
            self.dy,
            self.ny,
            self.bc.south,
            self.bc.north,
            "y",
        );
        (i, j)
    }

    /// Maps every enabled grain to its containing cell, overwriting the
    /// per-cell grain lists and refreshing the grain's cached cell for
    /// `layer`. O(n) in grain count.
    pub fn sort_grains(&mut self, store: &mut GrainStore, layer: FluidLayer) {
        for list in &mut self.cell_lists {
            list.clear();
        }
        self.cell_lists.resize(self.nx * self.ny, Vec::new());

        for (index, grain) in store.iter_mut().enumerate() {
            let cached = match layer {
                FluidLayer::Ocean => &mut grain.ocean_grid_cell,
                FluidLayer::Atmosphere => &mut grain.atmosphere_grid_cell,
            };
            if !grain.enabled {
                *cached = None;
                continue;
            }
            let (i, j) = self.cell_containing_point(grain.lin_pos);
            *cached = Some((i, j));
            let cell = self.cell_index(i, j);
            self.cell_lists[cell].push(index);
        }
    }

    /// Copies another grid's grain sorting (cell lists and cached cells)
    /// instead of recomputing it. Only valid for collocated grids.
    pub fn copy_sorting_from(&mut self, other: &FluidGrid, store: &mut GrainStore, layer: FluidLayer) {
        self.cell_lists.clone_from(&other.cell_lists);
        for grain in store.iter_mut() {
            let source = match layer {
                FluidLayer::Ocean => grain.atmosphere_grid_cell,
                FluidLayer::Atmosphere => grain.ocean_grid_cell,
            };
            match layer {
                FluidLayer::Ocean => grain.ocean_grid_cell = source,
                FluidLayer::Atmosphere => grain.atmosphere_grid_cell = source,
            }
        }
    }

    /// The cell itself plus its adjacent cells, wrapping indices across
    /// periodic sides and skipping missing neighbors at the others.
    pub fn neighborhood(&self, i: usize, j: usize) -> Vec<(usize, usize)> {
        let mut cells = Vec::with_capacity(9);
        for dj in -1i64..=1 {
            for di in -1i64..=1 {
                let ii = i as i64 + di;
                let jj = j as i64 + dj;
                let wrapped_i = if ii < 0 || ii >= self.nx as i64 {
                    let side = if ii < 0 { self.bc.west } else { self.bc.east };
                    if side != BoundaryCondition::Periodic {
                        continue;
                    }
                    ii.rem_euclid(self.nx as i64) as usize
                } else {
                    ii as usize
                };
                let wrapped_j = if jj < 0 || jj >= self.ny as i64 {
                    let side = if jj < 0 { self.bc.south } else { self.bc.north };
                    if side != BoundaryCondition::Periodic {
                        continue;
                    }
                    jj.rem_euclid(self.ny as i64) as usize
                } else {
                    jj as usize
                };
                let cell = (wrapped_i, wrapped_j);
                if !cells.contains(&cell) {
                    cells.push(cell);
                }
            }
        }
        cells
    }

    /// Non-dimensional position of `pos` inside cell `(i, j)`, clamped to
    /// [0, 1]. Values outside the unit square by more than
    /// [`POSITION_EPS`] are reported once per call as a warning; both the
    /// drag and vorticity paths share this policy.
    pub fn nondimensional_cell_position(&self, cell: (usize, usize), pos: DVec2) -> DVec2 {
        let corner = self.corner_index(cell.0, cell.1);
        let x_tilde = (pos.x - self.xq[corner]) / self.dx;
        let y_tilde = (pos.y - self.yq[corner]) / self.dy;
        if !(-POSITION_EPS..=1.0 + POSITION_EPS).contains(&x_tilde)
            || !(-POSITION_EPS..=1.0 + POSITION_EPS).contains(&y_tilde)
        {
            warn!(
                "non-dimensional cell coordinates ({x_tilde}, {y_tilde}) outside [0, 1], clamping"
            );
        }
        DVec2::new(x_tilde.clamp(0.0, 1.0), y_tilde.clamp(0.0, 1.0))
    }

    /// Indices of the two stored time samples bracketing `t` and the
    /// interpolation weight of the later one. A single sample is returned
    /// exactly; times outside the stored range use the nearest sample.
    fn bracketing_samples(&self, t: f64) -> (usize, usize, f64) {
        if self.time.len() == 1 || t <= self.time[0] {
            return (0, 0, 0.0);
        }
        let last = self.time.len() - 1;
        if t >= self.time[last] {
            return (last, last, 0.0);
        }
        let hi = self.time.partition_point(|&sample| sample <= t);
        let lo = hi - 1;
        let weight = (t - self.time[lo]) / (self.time[hi] - self.time[lo]);
        (lo, hi, weight)
    }

    /// Corner velocity time-interpolated to `t`.
    fn corner_velocity(&self, i: usize, j: usize, samples: (usize, usize, f64)) -> DVec2 {
        let (lo, hi, w) = samples;
        let corner = self.corner_index(i, j);
        let u = self.u[lo][corner] * (1.0 - w) + self.u[hi][corner] * w;
        let v = self.v[lo][corner] * (1.0 - w) + self.v[hi][corner] * w;
        DVec2::new(u, v)
    }

    /// Velocity field interpolated to an exact position at time `t`:
    /// linear in time between the bracketing samples, bilinear in space
    /// across the enclosing cell's four corners.
    pub fn interpolate_velocity(&self, cell: (usize, usize), pos: DVec2, t: f64) -> DVec2 {
        let samples = self.bracketing_samples(t);
        let (i, j) = cell;
        let sw = self.corner_velocity(i, j, samples);
        let se = self.corner_velocity(i + 1, j, samples);
        let nw = self.corner_velocity(i, j + 1, samples);
        let ne = self.corner_velocity(i + 1, j + 1, samples);

        let p = self.nondimensional_cell_position(cell, pos);
        (se * p.x + sw * (1.0 - p.x)) * (1.0 - p.y) + (ne * p.x + nw * (1.0 - p.x)) * p.y
    }

    /// Discrete estimate of the local vorticity (∂v/∂x − ∂u/∂y) at `pos`,
    /// from bilinear-weighted finite differences of the corner velocities.
    pub fn interpolate_curl(&self, cell: (usize, usize), pos: DVec2, t: f64) -> f64 {
        let samples = self.bracketing_samples(t);
        let (i, j) = cell;
        let sw = self.corner_velocity(i, j, samples);
        let se = self.corner_velocity(i + 1, j, samples);
        let nw = self.corner_velocity(i, j + 1, samples);
        let ne = self.corner_velocity(i + 1, j + 1, samples);

        let p = self.nondimensional_cell_position(cell, pos);
        let dvdx = ((ne.y - nw.y) * p.y + (se.y - sw.y) * (1.0 - p.y)) / self.dx;
        let dudy = ((ne.x - se.x) * p.x + (nw.x - sw.x) * (1.0 - p.x)) / self.dy;
        dvdx - dudy
    }

    /// Field-by-field comparison with tolerance `tol` on floating values.
    pub fn approx_eq(&self, other: &FluidGrid, tol: f64) -> bool {
        self.nx == other.nx
            && self.ny == other.ny
            && self.bc == other.bc
            && approx_eq(self.dx, other.dx, tol)
            && approx_eq(self.dy, other.dy, tol)
            && self.origin.abs_diff_eq(other.origin, tol)
            && self.time.len() == other.time.len()
            && self
                .time
                .iter()
                .zip(&other.time)
                .all(|(a, b)| approx_eq(*a, *b, tol))
            && self
                .u
                .iter()
                .flatten()
                .zip(other.u.iter().flatten())
                .all(|(a, b)| approx_eq(*a, *b, tol))
            && self
                .v
                .iter()
                .flatten()
                .zip(other.v.iter().flatten())
                .all(|(a, b)| approx_eq(*a, *b, tol))
    }
}
