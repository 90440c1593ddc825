//! Integration: teleop dispatch scenarios against the simulated devices.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use otis_common::prelude::*;
use otis_control::latch::ToggleLatch;
use otis_control::lift::{LiftController, LiftHandle};
use otis_control::stages::StageTable;
use otis_control::teleop::TeleopLoop;
use otis_hal::{
    ChassisCall, ChassisLog, DoutObserver, MotorObserver, ScriptedPad, SimChassis, SimDigitalOut,
    SimMotorGroup,
};

struct Harness {
    teleop: TeleopLoop<ScriptedPad, SimChassis, SimMotorGroup, SimDigitalOut>,
    lift: LiftHandle,
    controller: LiftController,
    intake: MotorObserver,
    clamp: DoutObserver,
    chassis: ChassisLog,
}

fn harness(frames: Vec<PadFrame>) -> Harness {
    let config = RobotConfig::default();

    let lift_motor = SimMotorGroup::new(2.0);
    let controller = LiftController::spawn(lift_motor, &config.lift);
    let lift = controller.handle();

    let intake_motor = SimMotorGroup::new(0.0);
    let intake = intake_motor.observer();

    let clamp_out = SimDigitalOut::new();
    let clamp = clamp_out.observer();

    let sim_chassis = SimChassis::new();
    let chassis = sim_chassis.log_handle();

    let table = StageTable::new(config.lift.stages.as_slice()).unwrap();
    let teleop = TeleopLoop::new(
        ScriptedPad::from_frames(frames),
        sim_chassis,
        intake_motor,
        ToggleLatch::new(clamp_out),
        ToggleLatch::new(SimDigitalOut::new()),
        table,
        lift.clone(),
        &config,
    );

    Harness {
        teleop,
        lift,
        controller,
        intake,
        clamp,
        chassis,
    }
}

fn raise() -> PadFrame {
    PadFrame {
        raise: true,
        ..PadFrame::neutral()
    }
}

fn lower() -> PadFrame {
    PadFrame {
        lower: true,
        ..PadFrame::neutral()
    }
}

#[test]
fn three_raises_push_90_then_700_and_a_fourth_is_a_no_op() {
    let mut h = harness(vec![raise(), raise(), raise(), raise()]);
    assert_eq!(h.lift.target(), 2.0); // stowed at startup

    let mut pushed = Vec::new();
    for _ in 0..4 {
        let before = h.lift.target();
        h.teleop.cycle();
        let after = h.lift.target();
        if after != before {
            pushed.push(after);
        }
    }

    // Only two raises can succeed from index 0 of a 3-stage table.
    assert_eq!(pushed, vec![90.0, 700.0]);
    assert_eq!(h.teleop.stage(), 2);
    assert_eq!(h.lift.target(), 700.0);

    h.controller.stop();
}

#[test]
fn lower_walks_back_down_and_stops_at_the_bottom() {
    let mut h = harness(vec![raise(), raise(), lower(), lower(), lower()]);

    for _ in 0..5 {
        h.teleop.cycle();
    }

    assert_eq!(h.teleop.stage(), 0);
    assert_eq!(h.lift.target(), 2.0);

    h.controller.stop();
}

#[test]
fn analog_axes_are_forwarded_every_cycle() {
    let frame = PadFrame {
        throttle: 0.5,
        steer: -0.3,
        ..PadFrame::neutral()
    };
    let mut h = harness(vec![frame]);

    h.teleop.cycle();

    let drive_calls: Vec<ChassisCall> = h
        .chassis
        .calls()
        .into_iter()
        .map(|c| c.call)
        .filter(|c| matches!(c, ChassisCall::DriveCurvature { .. }))
        .collect();
    assert_eq!(
        drive_calls,
        vec![ChassisCall::DriveCurvature {
            throttle: 0.5,
            steer: -0.3
        }]
    );

    h.controller.stop();
}

#[test]
fn clamp_edge_writes_hardware_exactly_once() {
    let toggle = PadFrame {
        clamp_toggle: true,
        ..PadFrame::neutral()
    };
    let mut h = harness(vec![toggle, PadFrame::neutral(), toggle]);

    h.teleop.cycle();
    assert!(h.clamp.value());
    assert_eq!(h.clamp.writes(), 1);

    h.teleop.cycle(); // no edge, no write
    assert_eq!(h.clamp.writes(), 1);

    h.teleop.cycle();
    assert!(!h.clamp.value());
    assert_eq!(h.clamp.writes(), 2);

    h.controller.stop();
}

#[test]
fn run_exits_on_the_shutdown_flag_and_stops_the_intake() {
    // Hold the intake forward long enough to observe it running.
    let intake_held = PadFrame {
        intake_in: true,
        ..PadFrame::neutral()
    };
    let h = harness(vec![intake_held; 64]);
    let Harness {
        mut teleop,
        intake,
        controller,
        ..
    } = h;

    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    let driver = thread::spawn(move || {
        teleop.run(&flag);
    });

    thread::sleep(Duration::from_millis(80));
    assert_eq!(intake.last_command(), 600.0);

    running.store(false, Ordering::Release);
    driver.join().unwrap();

    assert_eq!(intake.last_command(), 0.0);
    controller.stop();
}
