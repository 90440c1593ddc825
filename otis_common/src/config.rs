//! Configuration structures for the robot program.
//!
//! All config types use `serde::Deserialize` for TOML loading. Every field
//! has a serde default, so an empty file yields the reference robot tuning.
//! Numeric bounds live in [`crate::consts`] and are enforced by `validate()`.

use heapless::Vec as FixedVec;
use serde::{Deserialize, Serialize};

use crate::consts::{
    AUTON_TIMEOUT_MS_DEFAULT, DEFAULT_STAGES, INTAKE_SPEED_DEFAULT, LIFT_LOG_INTERVAL_DEFAULT,
    LIFT_MAX_VELOCITY_DEFAULT, LIFT_TICK_MS_DEFAULT, LIFT_TICK_MS_MAX, LIFT_TICK_MS_MIN,
    LIFT_TOLERANCE_DEFAULT, MAX_STAGES, TELEOP_PERIOD_MS_DEFAULT, TELEOP_PERIOD_MS_MAX,
    TELEOP_PERIOD_MS_MIN,
};

// ─── Top-Level Config ───────────────────────────────────────────────

/// Complete robot configuration, loaded from TOML at startup.
///
/// Immutable once the drivers start.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RobotConfig {
    /// Lift controller tuning.
    #[serde(default)]
    pub lift: LiftConfig,

    /// Teleop dispatch loop tuning.
    #[serde(default)]
    pub teleop: TeleopConfig,

    /// Autonomous route parameters.
    #[serde(default)]
    pub auton: AutonConfig,
}

impl RobotConfig {
    /// Validate all sections. Any violation is startup-fatal.
    pub fn validate(&self) -> Result<(), String> {
        self.lift.validate()?;
        self.teleop.validate()?;
        self.auton.validate(self.lift.stages.len())?;
        Ok(())
    }
}

// ─── Lift Config ────────────────────────────────────────────────────

/// Lift controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiftConfig {
    /// Ordered stage setpoints [motor units], index 0 = stowed.
    #[serde(default = "default_stages")]
    pub stages: FixedVec<f64, MAX_STAGES>,

    /// In-position tolerance [motor units].
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Convergence task tick period [ms].
    #[serde(default = "default_lift_tick_ms")]
    pub tick_period_ms: u64,

    /// Velocity cap applied at startup [motor units/s].
    #[serde(default = "default_max_velocity")]
    pub max_velocity: f64,

    /// Throttled telemetry interval [ticks].
    #[serde(default = "default_log_interval")]
    pub log_interval: u32,
}

fn default_stages() -> FixedVec<f64, MAX_STAGES> {
    FixedVec::from_slice(&DEFAULT_STAGES).unwrap_or_default()
}
fn default_tolerance() -> f64 {
    LIFT_TOLERANCE_DEFAULT
}
fn default_lift_tick_ms() -> u64 {
    LIFT_TICK_MS_DEFAULT
}
fn default_max_velocity() -> f64 {
    LIFT_MAX_VELOCITY_DEFAULT
}
fn default_log_interval() -> u32 {
    LIFT_LOG_INTERVAL_DEFAULT
}

impl Default for LiftConfig {
    fn default() -> Self {
        Self {
            stages: default_stages(),
            tolerance: default_tolerance(),
            tick_period_ms: default_lift_tick_ms(),
            max_velocity: default_max_velocity(),
            log_interval: default_log_interval(),
        }
    }
}

impl LiftConfig {
    /// Validate parameter bounds.
    pub fn validate(&self) -> Result<(), String> {
        if self.stages.is_empty() {
            return Err("lift.stages must not be empty".to_string());
        }
        for pair in self.stages.windows(2) {
            if pair[0] >= pair[1] {
                return Err(format!(
                    "lift.stages must be strictly ascending ({} >= {})",
                    pair[0], pair[1]
                ));
            }
        }
        if self.tolerance <= 0.0 {
            return Err(format!("lift.tolerance {} must be > 0", self.tolerance));
        }
        if self.tick_period_ms < LIFT_TICK_MS_MIN || self.tick_period_ms > LIFT_TICK_MS_MAX {
            return Err(format!(
                "lift.tick_period_ms {} out of range [{}, {}]",
                self.tick_period_ms, LIFT_TICK_MS_MIN, LIFT_TICK_MS_MAX
            ));
        }
        if self.max_velocity <= 0.0 {
            return Err(format!(
                "lift.max_velocity {} must be > 0",
                self.max_velocity
            ));
        }
        if self.log_interval == 0 {
            return Err("lift.log_interval must be > 0".to_string());
        }
        Ok(())
    }
}

// ─── Teleop Config ──────────────────────────────────────────────────

/// Teleop dispatch loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeleopConfig {
    /// Dispatch cycle period [ms].
    #[serde(default = "default_teleop_period_ms")]
    pub period_ms: u64,

    /// Default intake velocity magnitude [motor units/s].
    #[serde(default = "default_intake_speed")]
    pub intake_speed: f64,
}

fn default_teleop_period_ms() -> u64 {
    TELEOP_PERIOD_MS_DEFAULT
}
fn default_intake_speed() -> f64 {
    INTAKE_SPEED_DEFAULT
}

impl Default for TeleopConfig {
    fn default() -> Self {
        Self {
            period_ms: default_teleop_period_ms(),
            intake_speed: default_intake_speed(),
        }
    }
}

impl TeleopConfig {
    /// Validate parameter bounds.
    pub fn validate(&self) -> Result<(), String> {
        if self.period_ms < TELEOP_PERIOD_MS_MIN || self.period_ms > TELEOP_PERIOD_MS_MAX {
            return Err(format!(
                "teleop.period_ms {} out of range [{}, {}]",
                self.period_ms, TELEOP_PERIOD_MS_MIN, TELEOP_PERIOD_MS_MAX
            ));
        }
        if self.intake_speed <= 0.0 {
            return Err(format!(
                "teleop.intake_speed {} must be > 0",
                self.intake_speed
            ));
        }
        Ok(())
    }
}

// ─── Auton Config ───────────────────────────────────────────────────

/// A field pose (position + heading).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PoseConfig {
    pub x: f64,
    pub y: f64,
    pub heading_deg: f64,
}

/// Autonomous route parameters for the reference route.
///
/// The route shape itself is fixed (set pose → turn → settle → lift →
/// settle → move); these fields tune it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutonConfig {
    /// Absolute starting pose.
    #[serde(default = "default_start_pose")]
    pub start_pose: PoseConfig,

    /// Heading for the opening turn [deg].
    #[serde(default = "default_turn_heading")]
    pub turn_heading_deg: f64,

    /// Delay between the opening turn and the lift command [ms].
    #[serde(default = "default_pre_lift_settle_ms")]
    pub pre_lift_settle_ms: u64,

    /// Stage index the lift is sent to mid-route.
    #[serde(default = "default_lift_stage")]
    pub lift_stage: usize,

    /// Delay for the lift to finish its motion [ms].
    #[serde(default = "default_post_lift_settle_ms")]
    pub post_lift_settle_ms: u64,

    /// Pose driven to after the lift settles.
    #[serde(default = "default_end_pose")]
    pub end_pose: PoseConfig,

    /// Timeout bound for each locomotion command [ms].
    #[serde(default = "default_auton_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_start_pose() -> PoseConfig {
    PoseConfig {
        x: 65.17,
        y: 12.5,
        heading_deg: 180.0,
    }
}
fn default_turn_heading() -> f64 {
    134.0
}
fn default_pre_lift_settle_ms() -> u64 {
    75
}
fn default_lift_stage() -> usize {
    2
}
fn default_post_lift_settle_ms() -> u64 {
    125
}
fn default_end_pose() -> PoseConfig {
    PoseConfig {
        x: 68.17,
        y: 12.5,
        heading_deg: 0.0,
    }
}
fn default_auton_timeout_ms() -> u64 {
    AUTON_TIMEOUT_MS_DEFAULT
}

impl Default for AutonConfig {
    fn default() -> Self {
        Self {
            start_pose: default_start_pose(),
            turn_heading_deg: default_turn_heading(),
            pre_lift_settle_ms: default_pre_lift_settle_ms(),
            lift_stage: default_lift_stage(),
            post_lift_settle_ms: default_post_lift_settle_ms(),
            end_pose: default_end_pose(),
            timeout_ms: default_auton_timeout_ms(),
        }
    }
}

impl AutonConfig {
    /// Validate against the configured stage count.
    pub fn validate(&self, stage_count: usize) -> Result<(), String> {
        if self.lift_stage >= stage_count {
            return Err(format!(
                "auton.lift_stage {} out of range [0, {}]",
                self.lift_stage,
                stage_count.saturating_sub(1)
            ));
        }
        if self.timeout_ms == 0 {
            return Err("auton.timeout_ms must be > 0".to_string());
        }
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
