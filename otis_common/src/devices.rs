//! Device collaborator traits and error types.
//!
//! This module defines the narrow interfaces the core consumes:
//! - `Locomotion` - chassis locomotion/odometry engine
//! - `MotorGroup` - one or more physically coupled motors with feedback
//! - `DigitalOutput` - fire-and-forget binary output (pneumatics etc.)
//! - `Gamepad` - per-cycle human input snapshot
//! - `DeviceError` - error type for fallible device operations
//!
//! Backends (real hardware or simulation) implement these traits; the
//! control core never talks to devices through anything wider.

use std::time::Duration;
use thiserror::Error;

/// Error types for device operations.
#[derive(Debug, Clone, Error)]
pub enum DeviceError {
    /// Position/velocity feedback unavailable or out of range this tick.
    #[error("feedback unavailable: {0}")]
    Feedback(String),

    /// The device refused or failed to apply a command.
    #[error("command rejected: {0}")]
    CommandRejected(String),

    /// The device is not reachable at all.
    #[error("device offline: {0}")]
    Offline(String),
}

/// Chassis locomotion/odometry engine.
///
/// Pose estimation, path/turn control, and velocity profiling live behind
/// this trait. `turn_to_heading` and `move_to_pose` block the calling task
/// until completion or timeout — abandoning a move at timeout is the
/// engine's responsibility, not the caller's.
///
/// Headings are degrees, positions are field units.
pub trait Locomotion {
    /// Calibrate sensors. Called once at startup, may block.
    fn calibrate(&mut self);

    /// Override the estimated pose with an absolute starting pose.
    fn set_pose(&mut self, x: f64, y: f64, heading_deg: f64);

    /// Turn in place to the given heading. Blocks until done or timeout.
    fn turn_to_heading(&mut self, heading_deg: f64, timeout: Duration);

    /// Drive to the given pose. Blocks until done or timeout.
    fn move_to_pose(&mut self, x: f64, y: f64, heading_deg: f64, timeout: Duration);

    /// Apply one cycle's curvature drive command. Non-blocking.
    ///
    /// `throttle` and `steer` are signed scalars in the gamepad's axis range.
    fn drive_curvature(&mut self, throttle: f64, steer: f64);
}

/// One logical actuator: one or more physically ganged motors commanded
/// as a unit, with combined position feedback.
pub trait MotorGroup: Send {
    /// Command a signed velocity [motor units/s].
    fn set_velocity(&mut self, velocity: f64) -> Result<(), DeviceError>;

    /// Current sensed/estimated position [motor units].
    ///
    /// # Errors
    /// Returns [`DeviceError::Feedback`] when feedback is unavailable this
    /// read — callers treat that as "position unknown for this tick".
    fn position(&self) -> Result<f64, DeviceError>;
}

/// Fire-and-forget binary output device. No acknowledgement.
pub trait DigitalOutput {
    /// Drive the output high (`true`) or low (`false`).
    fn set_value(&mut self, high: bool);
}

/// One cycle's worth of already-debounced human input.
///
/// The `*_toggle`, `raise` and `lower` fields are *new-press edges*: true
/// only on the cycle the button transitions from unpressed to pressed.
/// Edge detection and debouncing are the input device's responsibility.
/// `intake_in`/`intake_out` are level signals (held state).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PadFrame {
    /// Forward/back drive axis, signed.
    pub throttle: f64,
    /// Turn drive axis, signed.
    pub steer: f64,
    /// Intake-forward button held.
    pub intake_in: bool,
    /// Intake-reverse button held.
    pub intake_out: bool,
    /// Clamp toggle new-press edge.
    pub clamp_toggle: bool,
    /// Sweeper toggle new-press edge.
    pub sweeper_toggle: bool,
    /// Lift raise new-press edge.
    pub raise: bool,
    /// Lift lower new-press edge.
    pub lower: bool,
}

impl PadFrame {
    /// A frame with no input at all (sticks centered, nothing pressed).
    pub const fn neutral() -> Self {
        Self {
            throttle: 0.0,
            steer: 0.0,
            intake_in: false,
            intake_out: false,
            clamp_toggle: false,
            sweeper_toggle: false,
            raise: false,
            lower: false,
        }
    }
}

/// Human input device, sampled once per dispatch cycle.
pub trait Gamepad {
    /// Read the current input frame. A disconnected pad yields neutral.
    fn sample(&mut self) -> PadFrame;
}
