//! Autonomous sequencer.
//!
//! A strictly ordered, non-interactive script: locomotion commands
//! (blocking, timeout-bounded by the chassis engine), lift target pushes
//! (non-blocking), and unconditional settling delays between them. No
//! branching, no retry, no feedback — open-loop by design; the total run
//! time is bounded externally.

use std::thread;
use std::time::Duration;

use otis_common::config::AutonConfig;
use otis_common::devices::Locomotion;
use tracing::info;

use crate::lift::LiftHandle;
use crate::stages::StageTable;

/// One scripted action. Immutable once defined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Override the estimated pose with an absolute starting pose.
    SetPose { x: f64, y: f64, heading_deg: f64 },
    /// Turn in place; completes or is abandoned at the timeout.
    TurnTo { heading_deg: f64, timeout: Duration },
    /// Drive to a pose; completes or is abandoned at the timeout.
    MoveTo {
        x: f64,
        y: f64,
        heading_deg: f64,
        timeout: Duration,
    },
    /// Push a lift setpoint. Non-blocking — the lift converges on its own.
    LiftTarget(f64),
    /// Unconditional fixed-duration pause to let physical motion settle.
    Settle(Duration),
}

impl Step {
    /// Whether this step blocks the driver task.
    pub const fn is_blocking(&self) -> bool {
        matches!(
            self,
            Step::TurnTo { .. } | Step::MoveTo { .. } | Step::Settle(_)
        )
    }
}

/// An ordered list of steps.
#[derive(Debug, Clone)]
pub struct Route {
    steps: Vec<Step>,
}

impl Route {
    /// Build the reference route from config, resolving the scripted stage
    /// index against the stage table. An out-of-range stage is a startup
    /// error, not a runtime one.
    pub fn from_config(auton: &AutonConfig, table: &StageTable) -> Result<Self, String> {
        let lift_target = table.get(auton.lift_stage).ok_or_else(|| {
            format!(
                "auton lift stage {} not in stage table (len {})",
                auton.lift_stage,
                table.len()
            )
        })?;
        let timeout = Duration::from_millis(auton.timeout_ms);

        Ok(Self {
            steps: vec![
                Step::SetPose {
                    x: auton.start_pose.x,
                    y: auton.start_pose.y,
                    heading_deg: auton.start_pose.heading_deg,
                },
                Step::TurnTo {
                    heading_deg: auton.turn_heading_deg,
                    timeout,
                },
                Step::Settle(Duration::from_millis(auton.pre_lift_settle_ms)),
                Step::LiftTarget(lift_target),
                Step::Settle(Duration::from_millis(auton.post_lift_settle_ms)),
                Step::MoveTo {
                    x: auton.end_pose.x,
                    y: auton.end_pose.y,
                    heading_deg: auton.end_pose.heading_deg,
                    timeout,
                },
            ],
        })
    }

    /// Build a custom route.
    pub fn from_steps(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Executes a route exactly once, strictly in order.
pub struct Sequencer {
    route: Route,
}

impl Sequencer {
    pub fn new(route: Route) -> Self {
        Self { route }
    }

    /// Run every step to completion. Consumes the sequencer — steps are
    /// never replayed or skipped. A locomotion command that times out is
    /// the chassis engine's concern; the next step starts regardless.
    pub fn run<C: Locomotion>(self, chassis: &mut C, lift: &LiftHandle) {
        for (n, step) in self.route.steps.into_iter().enumerate() {
            info!(n, ?step, "auton step");
            match step {
                Step::SetPose { x, y, heading_deg } => chassis.set_pose(x, y, heading_deg),
                Step::TurnTo {
                    heading_deg,
                    timeout,
                } => chassis.turn_to_heading(heading_deg, timeout),
                Step::MoveTo {
                    x,
                    y,
                    heading_deg,
                    timeout,
                } => chassis.move_to_pose(x, y, heading_deg, timeout),
                Step::LiftTarget(target) => lift.set_target(target),
                Step::Settle(delay) => thread::sleep(delay),
            }
        }
        info!("auton route complete");
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
