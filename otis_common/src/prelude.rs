//! Prelude module for common re-exports.
//!
//! Consumers can `use otis_common::prelude::*;` and get the device traits
//! and the most important types without listing individual paths.

use std::time::Duration;

// ─── Devices ────────────────────────────────────────────────────────
pub use crate::devices::{DeviceError, DigitalOutput, Gamepad, Locomotion, MotorGroup, PadFrame};

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{AutonConfig, LiftConfig, PoseConfig, RobotConfig, TeleopConfig};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{MAX_STAGES, TELEOP_PERIOD_MS_DEFAULT};

/// Default teleop dispatch period as a Duration.
pub const DEFAULT_TELEOP_PERIOD: Duration = Duration::from_millis(TELEOP_PERIOD_MS_DEFAULT);
