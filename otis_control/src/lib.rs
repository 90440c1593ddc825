//! # Otis Control Library
//!
//! Driver core for a mobile robot with a multi-stage lift, a clamp, a
//! sweeper and an intake. Two mutually exclusive drivers command the
//! actuators — a scripted autonomous sequencer and a fixed-period teleop
//! dispatch loop — while the lift converges toward discrete stage
//! setpoints on its own background task, never blocking either driver.
//!
//! ## Architecture
//!
//! 1. **[`lift`]** — asynchronous position controller: a convergence
//!    thread spawned at construction, retargeted through a single-slot
//!    atomic setpoint hand-off.
//! 2. **[`teleop`]** — polling dispatch loop: drive, intake, latch edges,
//!    stage raise/lower.
//! 3. **[`auton`]** — ordered, time-gated script of locomotion and lift
//!    commands with settling delays.
//! 4. **[`latch`]** / **[`stages`]** — toggle-on-edge actuator wrapper and
//!    bounded stage cursor.
//!
//! The chassis engine and device I/O live behind the `otis_common` traits;
//! this crate never touches hardware directly.

pub mod auton;
pub mod config;
pub mod latch;
pub mod lift;
pub mod rt;
pub mod stages;
pub mod teleop;
