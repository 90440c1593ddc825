//! Teleop dispatch loop.
//!
//! Fixed-period polling cycle for human-operated control. Each cycle
//! samples one input frame and fans it out: analog axes to the chassis,
//! intake levels to the intake motor, new-press edges to the latches and
//! the stage cursor. Stage changes push the newly selected setpoint into
//! the lift controller — the loop never waits for the lift to arrive, it
//! only ever issues one-shot commands.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use otis_common::config::RobotConfig;
use otis_common::devices::{DigitalOutput, Gamepad, Locomotion, MotorGroup};
use tracing::{debug, info, warn};

use crate::latch::ToggleLatch;
use crate::lift::LiftHandle;
use crate::stages::{StageIndex, StageTable};

/// The teleop driver. Owns every actuator surface except the lift motor
/// group, which belongs to the convergence task — the loop only holds the
/// lift's setpoint handle.
pub struct TeleopLoop<P, C, M, D>
where
    P: Gamepad,
    C: Locomotion,
    M: MotorGroup,
    D: DigitalOutput,
{
    pad: P,
    chassis: C,
    intake: M,
    clamp: ToggleLatch<D>,
    sweeper: ToggleLatch<D>,
    stages: StageIndex,
    table: StageTable,
    lift: LiftHandle,
    /// Current intake velocity magnitude. Reset to the default on every
    /// accepted raise edge (and only then).
    intake_speed: f64,
    default_intake_speed: f64,
    lift_max_velocity: f64,
    period: Duration,
}

impl<P, C, M, D> TeleopLoop<P, C, M, D>
where
    P: Gamepad,
    C: Locomotion,
    M: MotorGroup,
    D: DigitalOutput,
{
    pub fn new(
        pad: P,
        chassis: C,
        intake: M,
        clamp: ToggleLatch<D>,
        sweeper: ToggleLatch<D>,
        table: StageTable,
        lift: LiftHandle,
        config: &RobotConfig,
    ) -> Self {
        Self {
            pad,
            chassis,
            intake,
            clamp,
            sweeper,
            stages: StageIndex::new(table.len()),
            table,
            lift,
            intake_speed: config.teleop.intake_speed,
            default_intake_speed: config.teleop.intake_speed,
            lift_max_velocity: config.lift.max_velocity,
            period: Duration::from_millis(config.teleop.period_ms),
        }
    }

    /// Run one dispatch cycle.
    pub fn cycle(&mut self) {
        let frame = self.pad.sample();

        // 1. Drive.
        self.chassis.drive_curvature(frame.throttle, frame.steer);

        // 2. Intake — forward wins over reverse.
        let intake_cmd = if frame.intake_in {
            self.intake_speed
        } else if frame.intake_out {
            -self.intake_speed
        } else {
            0.0
        };
        if let Err(e) = self.intake.set_velocity(intake_cmd) {
            warn!("intake command failed: {e}");
        }

        // 3. Latches.
        self.clamp.on_edge(frame.clamp_toggle);
        self.sweeper.on_edge(frame.sweeper_toggle);

        // 4. Raise: advance the cursor, restore full intake speed, push
        // the new setpoint. At the top this is a complete no-op.
        if frame.raise {
            if let Some(stage) = self.stages.advance() {
                self.intake_speed = self.default_intake_speed;
                if let Some(target) = self.table.get(stage) {
                    debug!(stage, target, "lift raise");
                    self.lift.set_target(target);
                }
            }
        }

        // 5. Lower: retreat and push. Intake speed is deliberately left
        // alone here.
        if frame.lower {
            if let Some(stage) = self.stages.retreat() {
                if let Some(target) = self.table.get(stage) {
                    debug!(stage, target, "lift lower");
                    self.lift.set_target(target);
                }
            }
        }
    }

    /// Enter the fixed-period dispatch loop until `running` clears.
    pub fn run(&mut self, running: &AtomicBool) {
        info!(period_ms = self.period.as_millis() as u64, "teleop started");
        self.lift.set_max_velocity(self.lift_max_velocity);

        while running.load(Ordering::Acquire) {
            let cycle_start = Instant::now();
            self.cycle();
            if let Some(remaining) = self.period.checked_sub(cycle_start.elapsed()) {
                thread::sleep(remaining);
            }
        }

        // Leave the intake stopped on the way out.
        let _ = self.intake.set_velocity(0.0);
        info!("teleop stopped");
    }

    /// Current stage cursor position.
    pub fn stage(&self) -> usize {
        self.stages.index()
    }

    /// Current intake velocity magnitude.
    pub fn intake_speed(&self) -> f64 {
        self.intake_speed
    }

    /// Override the intake velocity magnitude (tuning surface; the next
    /// accepted raise edge restores the config default).
    pub fn set_intake_speed(&mut self, speed: f64) {
        self.intake_speed = speed;
    }

    /// Clamp latch state.
    pub fn clamp_engaged(&self) -> bool {
        self.clamp.engaged()
    }

    /// Sweeper latch state.
    pub fn sweeper_engaged(&self) -> bool {
        self.sweeper.engaged()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
