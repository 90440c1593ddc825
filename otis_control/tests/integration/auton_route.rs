//! Integration: autonomous route ordering and timing.

use std::time::{Duration, Instant};

use otis_common::prelude::*;
use otis_control::auton::{Route, Sequencer};
use otis_control::lift::{LiftController, LiftState};
use otis_control::stages::StageTable;
use otis_hal::{ChassisCall, SimChassis, SimMotorGroup};

const MOTION_TIME: Duration = Duration::from_millis(20);

#[test]
fn steps_execute_strictly_in_order_with_delays_between() {
    let config = RobotConfig::default();
    let table = StageTable::new(config.lift.stages.as_slice()).unwrap();

    let mut chassis = SimChassis::new().with_motion_time(MOTION_TIME);
    let log = chassis.log_handle();

    let motor = SimMotorGroup::new(2.0);
    let lift = LiftController::spawn(motor, &config.lift);

    let route = Route::from_config(&config.auton, &table).unwrap();
    Sequencer::new(route).run(&mut chassis, &lift.handle());

    let calls = log.calls();
    assert_eq!(calls.len(), 3, "route issues exactly three chassis calls");

    assert_eq!(
        calls[0].call,
        ChassisCall::SetPose {
            x: 65.17,
            y: 12.5,
            heading_deg: 180.0
        }
    );
    assert_eq!(
        calls[1].call,
        ChassisCall::TurnToHeading {
            heading_deg: 134.0,
            timeout: Duration::from_millis(1000)
        }
    );
    assert_eq!(
        calls[2].call,
        ChassisCall::MoveToPose {
            x: 68.17,
            y: 12.5,
            heading_deg: 0.0,
            timeout: Duration::from_millis(1000)
        }
    );

    // The final move must not start before the turn's motion plus both
    // settling delays have elapsed: 20 + 75 + 125 ms.
    let gap = calls[2].at.duration_since(calls[1].at);
    assert!(
        gap >= Duration::from_millis(220),
        "move started after only {gap:?}"
    );

    // The lift was sent to the scripted stage.
    assert_eq!(lift.handle().target(), 700.0);

    lift.stop();
}

#[test]
fn lift_push_does_not_block_the_sequencer() {
    let config = RobotConfig::default();
    let table = StageTable::new(config.lift.stages.as_slice()).unwrap();

    let mut chassis = SimChassis::new().with_motion_time(MOTION_TIME);
    let motor = SimMotorGroup::new(2.0);
    let obs = motor.observer();
    let lift = LiftController::spawn(motor, &config.lift);

    let route = Route::from_config(&config.auton, &table).unwrap();
    let start = Instant::now();
    Sequencer::new(route).run(&mut chassis, &lift.handle());
    let elapsed = start.elapsed();

    // At the default 165 u/s cap, actually reaching stage 2 takes over
    // four seconds — the route must finish long before that, with the
    // lift still converging on its own.
    assert!(elapsed < Duration::from_millis(1500), "route took {elapsed:?}");
    assert_eq!(lift.handle().state(), LiftState::Converging);
    assert!(obs.position() < 700.0);

    lift.stop();
}
