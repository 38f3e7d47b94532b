use log::info;
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_NC_MAX, DEFAULT_TIME_STEP};
use crate::contact::{find_contacts_all_pairs, find_contacts_in_grid, resolve_contacts};
use crate::core::{Grain, GrainStore};
use crate::dynamics::{IntegrationScheme, Integrator};
use crate::error::{Result, SimError};
use crate::fluid::{apply_layer_drag, FluidGrid, FluidLayer};
use crate::utils::logging::ScopedTimer;
use crate::utils::math::approx_eq;

/// External hook for periodic state output. The engine calls these with
/// the current simulation state at the configured intervals; the on-disk
/// format (and any failure handling) belongs to the implementor.
pub trait OutputWriter {
    /// Called when a snapshot of the full simulation state is due.
    fn write_snapshot(&mut self, sim: &Simulation);

    /// Called at status-report intervals. Defaults to doing nothing; the
    /// engine already reports through `log`.
    fn write_status(&mut self, sim: &Simulation) {
        let _ = sim;
    }
}

/// Options controlling one invocation of [`Simulation::run`].
pub struct RunOptions {
    /// Report progress through `log::info!` at `status_interval`.
    pub verbose: bool,
    /// Iterations between status reports.
    pub status_interval: u64,
    /// Perform exactly one iteration, then return.
    pub single_step: bool,
    pub scheme: IntegrationScheme,
    /// Invoke the writer's snapshot hook every `file_time_step` of
    /// simulated time.
    pub write_snapshots: bool,
    pub writer: Option<Box<dyn OutputWriter>>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            verbose: true,
            status_interval: 100,
            single_step: false,
            scheme: IntegrationScheme::default(),
            write_snapshots: false,
            writer: None,
        }
    }
}

/// Central simulation container orchestrating all subsystems.
///
/// Owns the grain store and up to one ocean and one atmosphere grid. Each
/// step runs a fixed phase sequence: zero accumulators, grid sorting,
/// contact search, contact resolution, fluid drag, integration, and time
/// advance. All phases are synchronous and sequential, so the step is
/// fully deterministic for fixed inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    pub id: String,
    pub iteration: u64,
    pub time: f64,
    pub time_total: f64,
    pub time_step: f64,
    /// Simulated time between snapshot writes; 0 disables snapshots.
    pub file_time_step: f64,
    pub file_time_since_last: f64,
    /// Neighbor-slot capacity applied to grains as they are added.
    pub nc_max: usize,
    pub grains: GrainStore,
    pub ocean: Option<FluidGrid>,
    pub atmosphere: Option<FluidGrid>,
}

impl Simulation {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            iteration: 0,
            time: 0.0,
            time_total: 0.0,
            time_step: DEFAULT_TIME_STEP,
            file_time_step: 0.0,
            file_time_since_last: 0.0,
            nc_max: DEFAULT_NC_MAX,
            grains: GrainStore::new(),
            ocean: None,
            atmosphere: None,
        }
    }

    /// Appends a grain, sizing its neighbor list to this simulation's
    /// `nc_max`, and returns its index.
    pub fn add_grain(&mut self, mut grain: Grain) -> usize {
        grain.resize_contact_slots(self.nc_max);
        let index = self.grains.push(grain);
        info!("added grain {index} to simulation '{}'", self.id);
        index
    }

    /// Whether the run loop has passed its total-time bound.
    pub fn is_done(&self) -> bool {
        self.time > self.time_total
    }

    /// Advances the simulation by exactly one time step.
    pub fn step(&mut self, scheme: IntegrationScheme) -> Result<()> {
        {
            let _timer = ScopedTimer::new("accumulators::zero");
            for grain in self.grains.iter_mut() {
                grain.zero_accumulators();
            }
        }

        let collocated = match (&self.ocean, &self.atmosphere) {
            (Some(ocean), Some(atmosphere)) => ocean.collocated_with(atmosphere),
            _ => false,
        };
        {
            let _timer = ScopedTimer::new("grids::sort");
            if !collocated {
                if let Some(atmosphere) = self.atmosphere.as_mut() {
                    atmosphere.sort_grains(&mut self.grains, FluidLayer::Atmosphere);
                }
            }
            if let Some(ocean) = self.ocean.as_mut() {
                ocean.sort_grains(&mut self.grains, FluidLayer::Ocean);
                if collocated {
                    if let Some(atmosphere) = self.atmosphere.as_mut() {
                        atmosphere.copy_sorting_from(ocean, &mut self.grains, FluidLayer::Atmosphere);
                    }
                }
            }
        }

        {
            let _timer = ScopedTimer::new("contacts::search");
            if let Some(ocean) = self.ocean.as_ref() {
                find_contacts_in_grid(&mut self.grains, ocean, FluidLayer::Ocean)?;
            } else if let Some(atmosphere) = self.atmosphere.as_ref() {
                find_contacts_in_grid(&mut self.grains, atmosphere, FluidLayer::Atmosphere)?;
            } else {
                find_contacts_all_pairs(&mut self.grains)?;
            }
        }

        {
            let _timer = ScopedTimer::new("contacts::resolve");
            resolve_contacts(&mut self.grains, self.time_step)?;
        }

        {
            let _timer = ScopedTimer::new("fluid::drag");
            if self.ocean.is_some() {
                self.apply_ocean_drag()?;
            }
            if self.atmosphere.is_some() {
                self.apply_atmosphere_drag()?;
            }
        }

        {
            let _timer = ScopedTimer::new("integrator");
            Integrator::new(self.time_step, scheme).step(&mut self.grains);
        }

        self.iteration += 1;
        self.time += self.time_step;
        Ok(())
    }

    /// Ocean drag on all enabled grains; fatal if no ocean is configured.
    pub fn apply_ocean_drag(&mut self) -> Result<()> {
        let grid = self.ocean.as_ref().ok_or(SimError::MissingFluidGrid {
            layer: FluidLayer::Ocean,
        })?;
        apply_layer_drag(&mut self.grains, grid, FluidLayer::Ocean, self.time);
        Ok(())
    }

    /// Atmosphere drag on all enabled grains; fatal if no atmosphere grid
    /// is configured.
    pub fn apply_atmosphere_drag(&mut self) -> Result<()> {
        let grid = self.atmosphere.as_ref().ok_or(SimError::MissingFluidGrid {
            layer: FluidLayer::Atmosphere,
        })?;
        apply_layer_drag(&mut self.grains, grid, FluidLayer::Atmosphere, self.time);
        Ok(())
    }

    /// Executes the time-stepping loop until the total-time bound, or for
    /// exactly one iteration in single-step mode (extending the total time
    /// by one step when the current time already meets or exceeds it).
    pub fn run(&mut self, mut options: RunOptions) -> Result<()> {
        if options.single_step && self.time >= self.time_total {
            self.time_total += self.time_step;
        }

        while self.time <= self.time_total {
            self.step(options.scheme)?;

            if options.verbose
                && options.status_interval > 0
                && self.iteration % options.status_interval == 0
            {
                info!(
                    "'{}': t = {:.3}/{:.3} s, iteration {}",
                    self.id, self.time, self.time_total, self.iteration
                );
                if let Some(writer) = options.writer.as_mut() {
                    writer.write_status(self);
                }
            }

            self.file_time_since_last += self.time_step;
            if options.write_snapshots
                && self.file_time_step > 0.0
                && self.file_time_since_last >= self.file_time_step
            {
                self.file_time_since_last = 0.0;
                if let Some(writer) = options.writer.as_mut() {
                    writer.write_snapshot(self);
                }
            }

            if options.single_step {
                return Ok(());
            }
        }

        if options.verbose {
            info!(
                "simulation '{}' finished at t = {:.3} s after {} iterations",
                self.id, self.time, self.iteration
            );
        }
        Ok(())
    }

    /// Field-by-field comparison of two simulation states: all scalar time
    /// fields, every grain, and both grids, with tolerance `tol` on
    /// floating values. Intended for tests and restart verification.
    pub fn approx_eq(&self, other: &Simulation, tol: f64) -> bool {
        let grids_eq = |a: &Option<FluidGrid>, b: &Option<FluidGrid>| match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => a.approx_eq(b, tol),
            _ => false,
        };
        self.iteration == other.iteration
            && approx_eq(self.time, other.time, tol)
            && approx_eq(self.time_total, other.time_total, tol)
            && approx_eq(self.time_step, other.time_step, tol)
            && approx_eq(self.file_time_step, other.file_time_step, tol)
            && approx_eq(self.file_time_since_last, other.file_time_since_last, tol)
            && self.nc_max == other.nc_max
            && self.grains.len() == other.grains.len()
            && self
                .grains
                .iter()
                .zip(other.grains.iter())
                .all(|(a, b)| a.approx_eq(b, tol))
            && grids_eq(&self.ocean, &other.ocean)
            && grids_eq(&self.atmosphere, &other.atmosphere)
    }
}
