//! Car reachability and intercept search
//!
//! Plots and intercepts are rebuilt from the current snapshot every tick.

pub mod accel;
pub mod calculator;

pub use accel::{
    DistancePlot, DistanceTime, SUPERSONIC_SPEED, simulate_acceleration, simulate_air_acceleration,
};
pub use calculator::{
    BOOST_NEEDED_FOR_AERIAL, Intercept, NEEDS_AERIAL_THRESHOLD, NEEDS_JUMP_HIT_THRESHOLD,
    boost_budget, find_filtered_intercept, find_intercept, intercept_assuming_max_accel,
    is_vertically_accessible,
};
