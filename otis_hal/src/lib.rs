//! # Otis HAL
//!
//! Simulation backend for the `otis_common` device traits.
//!
//! Every simulated device hands out a cheap observation handle so tests
//! and diagnostics can watch what the core commanded without taking
//! ownership away from the component that drives the device.

pub mod sim;

pub use sim::chassis::{ChassisCall, ChassisLog, SimChassis};
pub use sim::io::{DoutObserver, SimDigitalOut};
pub use sim::motor::{MotorObserver, SimMotorGroup};
pub use sim::pad::ScriptedPad;
