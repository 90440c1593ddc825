//! Motor group simulator.
//!
//! `SimMotorGroup` integrates position from the commanded velocity against
//! wall-clock time: the plant tracks the commanded velocity instantly and
//! position advances by `velocity * dt` between observations. Feedback
//! faults can be injected through the observer handle to exercise the
//! fail-safe path of position controllers.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use otis_common::devices::{DeviceError, MotorGroup};
use tracing::trace;

#[derive(Debug)]
struct MotorState {
    /// Current position [motor units].
    position: f64,
    /// Commanded (and instantly tracked) velocity [motor units/s].
    velocity: f64,
    /// Last command issued, for observation.
    last_command: f64,
    /// Wall-clock time of the last physics advance.
    last_update: Instant,
    /// When set, `position()` reads fail with a feedback error.
    fail_feedback: bool,
}

impl MotorState {
    /// Integrate position up to `now`.
    fn advance(&mut self, now: Instant) {
        let dt = now.duration_since(self.last_update).as_secs_f64();
        if dt > 0.0 {
            self.position += self.velocity * dt;
            self.last_update = now;
        }
    }
}

/// Velocity-commanded motor group with simple integrating physics.
pub struct SimMotorGroup {
    state: Arc<Mutex<MotorState>>,
}

impl SimMotorGroup {
    /// Create a simulator at the given starting position.
    pub fn new(position: f64) -> Self {
        Self {
            state: Arc::new(Mutex::new(MotorState {
                position,
                velocity: 0.0,
                last_command: 0.0,
                last_update: Instant::now(),
                fail_feedback: false,
            })),
        }
    }

    /// Observation handle, usable while the group itself is owned elsewhere.
    pub fn observer(&self) -> MotorObserver {
        MotorObserver {
            state: Arc::clone(&self.state),
        }
    }
}

fn lock(state: &Mutex<MotorState>) -> MutexGuard<'_, MotorState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

impl MotorGroup for SimMotorGroup {
    fn set_velocity(&mut self, velocity: f64) -> Result<(), DeviceError> {
        let mut s = lock(&self.state);
        s.advance(Instant::now());
        s.velocity = velocity;
        s.last_command = velocity;
        trace!(position = s.position, velocity, "sim motor command");
        Ok(())
    }

    fn position(&self) -> Result<f64, DeviceError> {
        let mut s = lock(&self.state);
        if s.fail_feedback {
            return Err(DeviceError::Feedback("simulated encoder fault".to_string()));
        }
        s.advance(Instant::now());
        Ok(s.position)
    }
}

/// Shared view into a [`SimMotorGroup`], independent of who owns the group.
#[derive(Clone)]
pub struct MotorObserver {
    state: Arc<Mutex<MotorState>>,
}

impl MotorObserver {
    /// Current simulated position [motor units].
    pub fn position(&self) -> f64 {
        let mut s = lock(&self.state);
        s.advance(Instant::now());
        s.position
    }

    /// The last velocity command the motor group received.
    pub fn last_command(&self) -> f64 {
        lock(&self.state).last_command
    }

    /// Teleport the plant (external disturbance injection).
    pub fn set_position(&self, position: f64) {
        let mut s = lock(&self.state);
        s.advance(Instant::now());
        s.position = position;
    }

    /// Enable or clear the simulated feedback fault.
    pub fn set_feedback_failed(&self, failed: bool) {
        lock(&self.state).fail_feedback = failed;
    }
}
