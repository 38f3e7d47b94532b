//! Global configuration constants for the pack_ice engine.

/// Default maximum number of simultaneous contacts tracked per grain.
pub const DEFAULT_NC_MAX: usize = 16;

/// Ocean water density (kg/m³).
pub const OCEAN_DENSITY: f64 = 1000.0;

/// Atmosphere density at sea level (kg/m³).
pub const ATMOSPHERE_DENSITY: f64 = 1.2;

/// Fraction of a grain's thickness protruding above the water line.
pub const FREEBOARD_RATIO: f64 = 0.1;

/// Default sea-ice density used when deriving grain mass (kg/m³).
pub const ICE_DENSITY: f64 = 934.0;

/// Default integration time step (in seconds) used when none is given.
pub const DEFAULT_TIME_STEP: f64 = 1.0;

/// Loose tolerance for deciding whether a stiffness or damping parameter
/// is effectively zero when selecting a rheology branch.
pub const RHEOLOGY_EPS: f64 = 1e-12;

/// Tight tolerance used by state comparison of positions, velocities and
/// accumulated forces.
pub const STATE_EPS: f64 = 1e-9;

/// Tolerance on non-dimensional in-cell coordinates before a clamp to
/// [0, 1] is reported as out of range.
pub const POSITION_EPS: f64 = 1e-6;
