//! Velocity-command law for the lift convergence task.
//!
//! One pure function per tick: distance-proportional with a one-tick-reach
//! bound, saturated at the velocity cap, dead within tolerance. The
//! one-tick-reach bound means the command never carries the actuator past
//! the target by more than one tick's motion at the capped velocity.

/// Compute one tick's velocity command.
///
/// # Arguments
/// - `error`: target − actual position [motor units].
/// - `max_velocity`: velocity cap magnitude [motor units/s].
/// - `tolerance`: in-position window [motor units].
/// - `dt`: tick period [s].
///
/// # Returns
/// Signed velocity command [motor units/s]. Zero inside the tolerance
/// window (the holding command) and for a degenerate `dt`.
#[inline]
pub fn velocity_command(error: f64, max_velocity: f64, tolerance: f64, dt: f64) -> f64 {
    if dt <= 0.0 {
        return 0.0;
    }
    if error.abs() <= tolerance {
        return 0.0;
    }
    // Velocity that lands exactly on target within one tick.
    let reach = error.abs() / dt;
    error.signum() * reach.min(max_velocity.abs())
}

// ─── Tests ──────────────────────────────────────────────────────────
