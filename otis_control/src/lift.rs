//! Asynchronous lift position controller.
//!
//! [`LiftController::spawn`] allocates the shared setpoint block *and*
//! starts the background convergence thread in a single step — no caller
//! can observe a constructed-but-not-running controller. The motor group
//! moves into the thread and is never commanded by anyone else.
//!
//! ## Cross-task hand-off
//!
//! Target and velocity cap are single-slot atomic cells (f64 bit patterns
//! in `AtomicU64`, release/acquire). The driver task replaces them at any
//! time; the convergence task reads them at the top of every tick. Only
//! the latest value matters — no queue, no history. Last-write-wins, and
//! a writer can never be observed mid-update.
//!
//! ## Convergence tick
//!
//! Read target + cap → read position → compute the velocity command via
//! [`law::velocity_command`] → issue it. Within tolerance the command is
//! zero (holding). A sensing fault means "position unknown for this tick":
//! the task issues the holding command and skips the rest of the tick —
//! it never terminates on error.

pub mod law;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use otis_common::config::LiftConfig;
use otis_common::devices::MotorGroup;
use tracing::{debug, info, warn};

/// Convergence task state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LiftState {
    /// Driving toward the target.
    Converging = 0,
    /// Within tolerance of the target, issuing the holding command.
    Holding = 1,
}

impl LiftState {
    fn from_u8(raw: u8) -> Self {
        if raw == 1 {
            LiftState::Holding
        } else {
            LiftState::Converging
        }
    }
}

// ─── Shared Setpoint Block ──────────────────────────────────────────

/// State shared across the task boundary. Target and cap are written by
/// the driver task; position, state and ticks are telemetry published by
/// the convergence task.
struct SetpointBlock {
    target_bits: AtomicU64,
    max_velocity_bits: AtomicU64,
    position_bits: AtomicU64,
    state: AtomicU8,
    ticks: AtomicU64,
    running: AtomicBool,
}

impl SetpointBlock {
    fn new(target: f64, max_velocity: f64) -> Self {
        Self {
            target_bits: AtomicU64::new(target.to_bits()),
            max_velocity_bits: AtomicU64::new(max_velocity.to_bits()),
            position_bits: AtomicU64::new(f64::NAN.to_bits()),
            state: AtomicU8::new(LiftState::Converging as u8),
            ticks: AtomicU64::new(0),
            running: AtomicBool::new(true),
        }
    }
}

#[inline]
fn store_f64(cell: &AtomicU64, value: f64) {
    cell.store(value.to_bits(), Ordering::Release);
}

#[inline]
fn load_f64(cell: &AtomicU64) -> f64 {
    f64::from_bits(cell.load(Ordering::Acquire))
}

// ─── Caller Handle ──────────────────────────────────────────────────

/// Cheap, cloneable caller surface onto a running lift controller.
///
/// All methods return immediately; writes take effect on the next
/// convergence tick.
#[derive(Clone)]
pub struct LiftHandle {
    shared: Arc<SetpointBlock>,
}

impl LiftHandle {
    /// Replace the target setpoint [motor units]. May be called at any
    /// time, including while a previous move is in progress — the task
    /// retargets on its next tick without stopping first.
    pub fn set_target(&self, position: f64) {
        store_f64(&self.shared.target_bits, position);
    }

    /// Bound the magnitude of commanded velocity [motor units/s] for all
    /// subsequent ticks.
    pub fn set_max_velocity(&self, max_velocity: f64) {
        store_f64(&self.shared.max_velocity_bits, max_velocity);
    }

    /// Currently requested target.
    pub fn target(&self) -> f64 {
        load_f64(&self.shared.target_bits)
    }

    /// Current velocity cap.
    pub fn max_velocity(&self) -> f64 {
        load_f64(&self.shared.max_velocity_bits)
    }

    /// Last position the convergence task observed (NaN before the first
    /// successful feedback read).
    pub fn position(&self) -> f64 {
        load_f64(&self.shared.position_bits)
    }

    /// Current convergence state.
    pub fn state(&self) -> LiftState {
        LiftState::from_u8(self.shared.state.load(Ordering::Acquire))
    }

    /// Ticks executed so far.
    pub fn ticks(&self) -> u64 {
        self.shared.ticks.load(Ordering::Relaxed)
    }
}

// ─── Controller ─────────────────────────────────────────────────────

/// Owns the running convergence thread.
///
/// Constructed once at startup; lives until process teardown. A new
/// target simply supersedes the old one — there is no mid-motion
/// cancellation.
pub struct LiftController {
    handle: LiftHandle,
    thread: Option<JoinHandle<()>>,
}

impl LiftController {
    /// Construct the controller and start its convergence thread.
    ///
    /// The initial target is the first configured stage, so a freshly
    /// spawned controller converges to the stowed setpoint.
    pub fn spawn<M: MotorGroup + 'static>(motors: M, config: &LiftConfig) -> Self {
        let initial_target = config.stages.first().copied().unwrap_or(0.0);
        let shared = Arc::new(SetpointBlock::new(initial_target, config.max_velocity));

        let tick = Duration::from_millis(config.tick_period_ms);
        let tolerance = config.tolerance;
        let log_interval = u64::from(config.log_interval);

        let task_shared = Arc::clone(&shared);
        let thread = thread::spawn(move || {
            convergence_loop(motors, task_shared, tick, tolerance, log_interval);
        });

        info!(
            target = initial_target,
            max_velocity = config.max_velocity,
            tick_ms = config.tick_period_ms,
            "lift controller started"
        );

        Self {
            handle: LiftHandle { shared },
            thread: Some(thread),
        }
    }

    /// A cloneable caller handle.
    pub fn handle(&self) -> LiftHandle {
        self.handle.clone()
    }

    /// See [`LiftHandle::set_target`].
    pub fn set_target(&self, position: f64) {
        self.handle.set_target(position);
    }

    /// See [`LiftHandle::set_max_velocity`].
    pub fn set_max_velocity(&self, max_velocity: f64) {
        self.handle.set_max_velocity(max_velocity);
    }

    /// Stop the convergence thread and leave the actuator holding.
    /// Process-teardown only — the controller is never destroyed
    /// mid-program.
    pub fn stop(mut self) {
        self.handle.shared.running.store(false, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

// ─── Convergence Task ───────────────────────────────────────────────

fn convergence_loop<M: MotorGroup>(
    mut motors: M,
    shared: Arc<SetpointBlock>,
    tick: Duration,
    tolerance: f64,
    log_interval: u64,
) {
    let dt = tick.as_secs_f64();
    let mut fault_streak: u64 = 0;

    while shared.running.load(Ordering::Acquire) {
        let ok = run_tick(&mut motors, &shared, tolerance, dt);

        if !ok {
            fault_streak += 1;
            if fault_streak == 1 {
                warn!("lift feedback fault — holding until feedback returns");
            }
        } else if fault_streak > 0 {
            info!(ticks = fault_streak, "lift feedback recovered");
            fault_streak = 0;
        }

        let n = shared.ticks.fetch_add(1, Ordering::Relaxed) + 1;
        if n % log_interval == 0 {
            debug!(
                target = load_f64(&shared.target_bits),
                position = load_f64(&shared.position_bits),
                state = ?LiftState::from_u8(shared.state.load(Ordering::Relaxed)),
                "lift telemetry"
            );
        }

        thread::sleep(tick);
    }

    // Teardown: leave the actuator holding.
    let _ = motors.set_velocity(0.0);
}

/// One convergence tick. Returns `false` when feedback was unavailable
/// (the holding command was issued instead of a corrective one).
fn run_tick<M: MotorGroup>(
    motors: &mut M,
    shared: &SetpointBlock,
    tolerance: f64,
    dt: f64,
) -> bool {
    let target = load_f64(&shared.target_bits);
    let cap = load_f64(&shared.max_velocity_bits);

    let position = match motors.position() {
        Ok(p) => p,
        Err(e) => {
            debug!("lift feedback unavailable this tick: {e}");
            let _ = motors.set_velocity(0.0);
            return false;
        }
    };
    store_f64(&shared.position_bits, position);

    let error = target - position;
    let command = law::velocity_command(error, cap, tolerance, dt);

    let state = if error.abs() <= tolerance {
        LiftState::Holding
    } else {
        LiftState::Converging
    };
    shared.state.store(state as u8, Ordering::Release);

    if let Err(e) = motors.set_velocity(command) {
        warn!("lift command rejected: {e}");
    }
    true
}

// ─── Tests ──────────────────────────────────────────────────────────
