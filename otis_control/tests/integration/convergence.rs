//! Integration: lift convergence against the simulated motor.
//!
//! Validates the cross-task contract end to end: non-blocking retarget,
//! bounded-time convergence, idempotent holding, last-write-wins under a
//! concurrent reader, and the fail-safe sensing-fault path.

use std::thread;
use std::time::{Duration, Instant};

use otis_common::prelude::*;
use otis_control::lift::{LiftController, LiftState};
use otis_hal::SimMotorGroup;

/// Fast tuning so tests finish in tens of milliseconds.
fn fast_lift_config() -> LiftConfig {
    LiftConfig {
        tick_period_ms: 1,
        tolerance: 1.0,
        max_velocity: 2000.0,
        ..LiftConfig::default()
    }
}

/// Poll until `pred` holds or `timeout` elapses. Returns whether it held.
fn wait_until(timeout: Duration, mut pred: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if pred() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    pred()
}

#[test]
fn reaches_and_holds_the_target() {
    let motor = SimMotorGroup::new(2.0);
    let obs = motor.observer();
    let lift = LiftController::spawn(motor, &fast_lift_config());

    lift.set_target(100.0);
    assert!(
        wait_until(Duration::from_secs(2), || (obs.position() - 100.0).abs() <= 1.0),
        "never reached target, position {}",
        obs.position()
    );

    // Holding is idempotent: the command stays near zero and the position
    // stays put across many further ticks.
    thread::sleep(Duration::from_millis(50));
    assert_eq!(lift.handle().state(), LiftState::Holding);
    assert_eq!(obs.last_command(), 0.0);

    let settled = obs.position();
    thread::sleep(Duration::from_millis(100));
    assert!(
        (obs.position() - settled).abs() <= 1.0,
        "oscillating around target"
    );

    lift.stop();
}

#[test]
fn convergence_time_is_proportional_to_distance() {
    let motor = SimMotorGroup::new(0.0);
    let obs = motor.observer();
    let lift = LiftController::spawn(motor, &fast_lift_config());

    // 200 units at 2000 u/s is 100ms of motion; allow generous slack for
    // scheduler jitter but nowhere near the unbounded case.
    let start = Instant::now();
    lift.set_target(200.0);
    assert!(wait_until(Duration::from_secs(3), || {
        (obs.position() - 200.0).abs() <= 1.0
    }));
    assert!(
        start.elapsed() < Duration::from_millis(1500),
        "took {:?}",
        start.elapsed()
    );

    lift.stop();
}

#[test]
fn last_write_wins_under_concurrent_reads() {
    let motor = SimMotorGroup::new(0.0);
    let lift = LiftController::spawn(motor, &fast_lift_config());
    let handle = lift.handle();

    // Hammer the setpoint while the convergence task keeps reading it.
    for i in 0..1000 {
        handle.set_target(f64::from(i));
    }
    assert_eq!(handle.target(), 999.0);

    for v in [80.0, 165.0, 40.0] {
        handle.set_max_velocity(v);
    }
    assert_eq!(handle.max_velocity(), 40.0);

    lift.stop();
}

#[test]
fn retargets_mid_move_without_stopping_first() {
    let motor = SimMotorGroup::new(0.0);
    let obs = motor.observer();
    let lift = LiftController::spawn(motor, &fast_lift_config());

    lift.set_target(1000.0);
    assert!(
        wait_until(Duration::from_secs(2), || obs.position() > 100.0),
        "move never started"
    );

    // Supersede the old target while the move is still in progress.
    lift.set_target(0.0);
    assert!(
        wait_until(Duration::from_secs(2), || obs.position().abs() <= 1.0),
        "never converged on the superseding target, position {}",
        obs.position()
    );

    lift.stop();
}

#[test]
fn sensing_fault_fails_safe_to_holding() {
    let motor = SimMotorGroup::new(2.0);
    let obs = motor.observer();
    let lift = LiftController::spawn(motor, &fast_lift_config());

    obs.set_feedback_failed(true);
    lift.set_target(500.0);
    thread::sleep(Duration::from_millis(100));

    // No corrective command was ever issued: the plant did not move.
    assert_eq!(obs.last_command(), 0.0);
    assert!(
        (obs.position() - 2.0).abs() <= 0.5,
        "moved during feedback fault to {}",
        obs.position()
    );

    // Feedback returns: the pending target is honored.
    obs.set_feedback_failed(false);
    assert!(wait_until(Duration::from_secs(2), || {
        (obs.position() - 500.0).abs() <= 1.0
    }));

    lift.stop();
}

#[test]
fn external_disturbance_reconverges() {
    let motor = SimMotorGroup::new(0.0);
    let obs = motor.observer();
    let lift = LiftController::spawn(motor, &fast_lift_config());

    lift.set_target(100.0);
    assert!(wait_until(Duration::from_secs(2), || {
        lift.handle().state() == LiftState::Holding
    }));

    // Knock the lift away from its setpoint.
    obs.set_position(350.0);
    assert!(
        wait_until(Duration::from_secs(2), || {
            (obs.position() - 100.0).abs() <= 1.0
        }),
        "did not recover from disturbance"
    );

    lift.stop();
}
