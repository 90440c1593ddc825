//! Locomotion engine simulator.
//!
//! `SimChassis` records every call with a wall-clock timestamp and, for
//! the blocking commands, sleeps for a configurable simulated motion time
//! capped by the caller's timeout. The path/turn control itself is out of
//! scope — ordering and timing are what the recording is for.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use otis_common::devices::Locomotion;
use tracing::debug;

/// One recorded locomotion call.
#[derive(Debug, Clone, PartialEq)]
pub enum ChassisCall {
    Calibrate,
    SetPose {
        x: f64,
        y: f64,
        heading_deg: f64,
    },
    TurnToHeading {
        heading_deg: f64,
        timeout: Duration,
    },
    MoveToPose {
        x: f64,
        y: f64,
        heading_deg: f64,
        timeout: Duration,
    },
    DriveCurvature {
        throttle: f64,
        steer: f64,
    },
}

/// A call plus the instant it was issued.
#[derive(Debug, Clone)]
pub struct TimedCall {
    pub at: Instant,
    pub call: ChassisCall,
}

/// Recording locomotion engine.
pub struct SimChassis {
    log: Arc<Mutex<Vec<TimedCall>>>,
    /// Simulated duration of each blocking motion (capped by the timeout).
    motion_time: Duration,
}

impl SimChassis {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(Vec::new())),
            motion_time: Duration::from_millis(5),
        }
    }

    /// Override the simulated motion time for blocking commands.
    pub fn with_motion_time(mut self, motion_time: Duration) -> Self {
        self.motion_time = motion_time;
        self
    }

    /// Shared handle onto the call log.
    pub fn log_handle(&self) -> ChassisLog {
        ChassisLog {
            log: Arc::clone(&self.log),
        }
    }

    fn record(&self, call: ChassisCall) {
        debug!(?call, "sim chassis");
        lock(&self.log).push(TimedCall {
            at: Instant::now(),
            call,
        });
    }

    fn block_for_motion(&self, timeout: Duration) {
        std::thread::sleep(self.motion_time.min(timeout));
    }
}

impl Default for SimChassis {
    fn default() -> Self {
        Self::new()
    }
}

fn lock(log: &Mutex<Vec<TimedCall>>) -> MutexGuard<'_, Vec<TimedCall>> {
    log.lock().unwrap_or_else(|e| e.into_inner())
}

impl Locomotion for SimChassis {
    fn calibrate(&mut self) {
        self.record(ChassisCall::Calibrate);
    }

    fn set_pose(&mut self, x: f64, y: f64, heading_deg: f64) {
        self.record(ChassisCall::SetPose { x, y, heading_deg });
    }

    fn turn_to_heading(&mut self, heading_deg: f64, timeout: Duration) {
        self.record(ChassisCall::TurnToHeading {
            heading_deg,
            timeout,
        });
        self.block_for_motion(timeout);
    }

    fn move_to_pose(&mut self, x: f64, y: f64, heading_deg: f64, timeout: Duration) {
        self.record(ChassisCall::MoveToPose {
            x,
            y,
            heading_deg,
            timeout,
        });
        self.block_for_motion(timeout);
    }

    fn drive_curvature(&mut self, throttle: f64, steer: f64) {
        self.record(ChassisCall::DriveCurvature { throttle, steer });
    }
}

/// Shared view of a [`SimChassis`] call log.
#[derive(Clone)]
pub struct ChassisLog {
    log: Arc<Mutex<Vec<TimedCall>>>,
}

impl ChassisLog {
    /// Snapshot of all recorded calls, in issue order.
    pub fn calls(&self) -> Vec<TimedCall> {
        lock(&self.log).clone()
    }

    /// Number of calls recorded so far.
    pub fn len(&self) -> usize {
        lock(&self.log).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calls_are_recorded_in_order() {
        let mut chassis = SimChassis::new().with_motion_time(Duration::ZERO);
        let log = chassis.log_handle();
        assert!(log.is_empty());

        chassis.calibrate();
        chassis.set_pose(1.0, 2.0, 90.0);
        chassis.turn_to_heading(45.0, Duration::from_millis(100));
        chassis.drive_curvature(0.5, -0.25);

        assert_eq!(log.len(), 4);
        let calls: Vec<ChassisCall> = log.calls().into_iter().map(|c| c.call).collect();
        assert_eq!(calls[0], ChassisCall::Calibrate);
        assert_eq!(
            calls[1],
            ChassisCall::SetPose {
                x: 1.0,
                y: 2.0,
                heading_deg: 90.0
            }
        );
        assert!(matches!(calls[2], ChassisCall::TurnToHeading { .. }));
        assert_eq!(
            calls[3],
            ChassisCall::DriveCurvature {
                throttle: 0.5,
                steer: -0.25
            }
        );
    }

    #[test]
    fn blocking_motion_is_capped_by_timeout() {
        let mut chassis =
            SimChassis::new().with_motion_time(Duration::from_secs(10));
        let start = Instant::now();
        chassis.turn_to_heading(90.0, Duration::from_millis(20));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn timestamps_are_monotonic() {
        let mut chassis = SimChassis::new().with_motion_time(Duration::from_millis(1));
        let log = chassis.log_handle();

        chassis.turn_to_heading(10.0, Duration::from_millis(50));
        chassis.move_to_pose(0.0, 0.0, 0.0, Duration::from_millis(50));

        let calls = log.calls();
        assert!(calls[0].at <= calls[1].at);
    }
}
