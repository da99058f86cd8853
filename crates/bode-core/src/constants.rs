//! Numerical and instrumental constants
//!
//! Accuracy-class figures of the oscilloscope used to turn a full-scale
//! reading into an absolute instrumental error, plus numerical tolerances
//! shared by the fitting code.

/// Full-scale voltage readings at or below this value use the low-range
/// accuracy figure.
pub const VOLTAGE_LOW_RANGE_LIMIT: f64 = 0.01;

/// Relative accuracy of a voltage reading on the low ranges (<= 10 mV/div).
pub const VOLTAGE_ACCURACY_LOW: f64 = 0.045;

/// Relative accuracy of a voltage reading on every other range.
pub const VOLTAGE_ACCURACY_HIGH: f64 = 0.035;

/// Number of vertical scale divisions on the screen.
pub const VOLTAGE_PARTITIONS: f64 = 8.0;

/// Relative accuracy of the timebase.
pub const TIME_ACCURACY: f64 = 0.0016;

/// Number of horizontal scale divisions on the screen.
pub const TIME_PARTITIONS: f64 = 10.0;

/// Tolerance for detecting near-zero values in division and singularity checks.
pub const NEAR_ZERO: f64 = 1e-300;

/// Smallest variance treated as a real measurement error when weighting a fit.
pub const VARIANCE_FLOOR: f64 = 1e-300;

/// Upper bound on the Levenberg-Marquardt damping factor before giving up.
pub const MAX_LAMBDA: f64 = 1e16;

/// Default file written by the simulator.
pub const DEFAULT_SIMULATION_FILE: &str = "datasimulated.txt";

/// Default display label handed to the presentation layer.
pub const DEFAULT_LABEL: &str = "Preliminary";
