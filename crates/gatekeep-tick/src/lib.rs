//! Fixed-rate server clock for gatekeep.
//!
//! The gate enforces confinement by re-anchoring every unauthenticated
//! session once per server tick. This crate provides that tick: a
//! [`TickScheduler`] built on [`tokio::time::Interval`], with a
//! configurable rate, a policy for ticks missed while the loop was busy,
//! and budget monitoring so a slow tick shows up in the logs.
//!
//! # Integration
//!
//! The scheduler sits in the host actor's `tokio::select!` loop next to
//! the event channel:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(event) = events.recv() => { /* join, command, disconnect */ }
//!         _ = clock.wait_for_tick() => {
//!             gate.on_tick(&mut world);
//!             clock.record_tick_end();
//!         }
//!     }
//! }
//! ```

use std::time::{Duration, Instant};

use tokio::time::{self, Interval, MissedTickBehavior};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// What to do with ticks that came due while the loop was busy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickPolicy {
    /// Fire once for the missed ticks, then return to the original
    /// cadence. Enforcement is level-triggered, so repeating a missed
    /// tick buys nothing.
    #[default]
    Skip,
    /// Fire every missed tick back to back until caught up.
    Burst,
    /// Fire once, then restart the cadence from now.
    Delay,
}

impl From<TickPolicy> for MissedTickBehavior {
    fn from(policy: TickPolicy) -> Self {
        match policy {
            TickPolicy::Skip => MissedTickBehavior::Skip,
            TickPolicy::Burst => MissedTickBehavior::Burst,
            TickPolicy::Delay => MissedTickBehavior::Delay,
        }
    }
}

/// Configuration for the tick scheduler.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Ticks per second. Clamped to `1..=MAX_TICK_RATE_HZ`.
    pub tick_rate_hz: u32,
    /// Missed-tick handling.
    pub policy: TickPolicy,
    /// Fraction of the tick budget (0.0–1.0) above which a finished tick
    /// is logged as slow. Default: 0.80.
    pub budget_warn_threshold: f64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: Self::DEFAULT_TICK_RATE_HZ,
            policy: TickPolicy::default(),
            budget_warn_threshold: 0.80,
        }
    }
}

impl TickConfig {
    /// The classic 20 ticks per second.
    pub const DEFAULT_TICK_RATE_HZ: u32 = 20;

    /// Maximum supported tick rate.
    pub const MAX_TICK_RATE_HZ: u32 = 128;

    /// A config for a specific rate, other settings default.
    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self {
            tick_rate_hz,
            ..Default::default()
        }
    }

    /// Clamps out-of-range values. Called by [`TickScheduler::new`].
    ///
    /// - `tick_rate_hz` forced into `1..=MAX_TICK_RATE_HZ`; enforcement
    ///   needs a running clock, so 0 becomes 1.
    /// - `budget_warn_threshold` clamped to `0.0..=1.0`.
    pub fn validated(mut self) -> Self {
        let clamped = self.tick_rate_hz.clamp(1, Self::MAX_TICK_RATE_HZ);
        if clamped != self.tick_rate_hz {
            warn!(
                rate = self.tick_rate_hz,
                clamped,
                "tick_rate_hz out of range, clamping"
            );
            self.tick_rate_hz = clamped;
        }
        self.budget_warn_threshold = self.budget_warn_threshold.clamp(0.0, 1.0);
        self
    }

    /// Duration of one tick.
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_rate_hz.max(1)))
    }
}

// ---------------------------------------------------------------------------
// Tick info and metrics
// ---------------------------------------------------------------------------

/// What [`TickScheduler::wait_for_tick`] hands back each tick.
#[derive(Debug, Clone)]
pub struct TickInfo {
    /// Monotonically increasing tick number, starting at 1.
    pub tick: u64,
    /// Fixed tick length.
    pub dt: Duration,
    /// How far past its deadline this tick fired.
    pub late_by: Duration,
    /// `true` if `late_by` exceeds a tenth of `dt`.
    pub overrun: bool,
}

/// Running counters for the scheduler.
#[derive(Debug, Clone, Default)]
pub struct TickMetrics {
    /// Ticks fired.
    pub total_ticks: u64,
    /// Ticks that fired late (see [`TickInfo::overrun`]).
    pub total_overruns: u64,
    /// Slowest tick body reported through `record_tick_end`.
    pub max_tick_time: Duration,
    /// Most recent tick body time.
    pub last_tick_time: Duration,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Fixed-rate tick source for the host event loop.
///
/// The underlying [`Interval`] is created on the first
/// [`wait_for_tick`](Self::wait_for_tick), so a scheduler can be built
/// outside a Tokio runtime (e.g. while assembling server state).
pub struct TickScheduler {
    config: TickConfig,
    tick_duration: Duration,
    interval: Option<Interval>,
    tick_count: u64,
    /// Wall-clock start of the current tick body, consumed by
    /// `record_tick_end`.
    tick_start: Option<Instant>,
    metrics: TickMetrics,
}

impl TickScheduler {
    /// Creates a scheduler. The first tick fires one tick-length after the
    /// first call to `wait_for_tick`.
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        let tick_duration = config.tick_duration();

        debug!(
            rate_hz = config.tick_rate_hz,
            budget_ms = tick_duration.as_secs_f64() * 1000.0,
            policy = ?config.policy,
            "tick scheduler created"
        );

        Self {
            config,
            tick_duration,
            interval: None,
            tick_count: 0,
            tick_start: None,
            metrics: TickMetrics::default(),
        }
    }

    /// A scheduler for a specific rate with default settings.
    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self::new(TickConfig::with_rate(tick_rate_hz))
    }

    /// Waits for the next tick.
    ///
    /// Cancel-safe: dropping the future inside `select!` loses no tick;
    /// the next call picks up where this one left off.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        let period = self.tick_duration;
        let behavior = MissedTickBehavior::from(self.config.policy);
        let interval = self.interval.get_or_insert_with(|| {
            let mut iv = time::interval_at(time::Instant::now() + period, period);
            iv.set_missed_tick_behavior(behavior);
            iv
        });

        let deadline = interval.tick().await;
        let late_by = time::Instant::now().saturating_duration_since(deadline);
        let overrun = late_by > period / 10;

        self.tick_count += 1;
        self.tick_start = Some(Instant::now());
        self.metrics.total_ticks += 1;
        if overrun {
            self.metrics.total_overruns += 1;
            warn!(
                tick = self.tick_count,
                late_ms = late_by.as_secs_f64() * 1000.0,
                policy = ?self.config.policy,
                "tick fired late"
            );
        }

        trace!(tick = self.tick_count, overrun, "tick fired");

        TickInfo {
            tick: self.tick_count,
            dt: period,
            late_by,
            overrun,
        }
    }

    /// Marks the end of the current tick's work.
    ///
    /// Call after the gate's tick handler returns. Logs a warning when the
    /// work took more than `budget_warn_threshold` of the tick. A call
    /// without a preceding `wait_for_tick` does nothing.
    pub fn record_tick_end(&mut self) {
        let Some(start) = self.tick_start.take() else {
            return;
        };
        let elapsed = start.elapsed();
        let utilization = elapsed.as_secs_f64() / self.tick_duration.as_secs_f64();

        if utilization >= self.config.budget_warn_threshold {
            warn!(
                tick = self.tick_count,
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                budget_ms = self.tick_duration.as_secs_f64() * 1000.0,
                utilization_pct = format!("{:.1}", utilization * 100.0),
                "tick work approaching budget"
            );
        }

        self.metrics.last_tick_time = elapsed;
        self.metrics.max_tick_time = self.metrics.max_tick_time.max(elapsed);
    }

    /// Ticks fired so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Snapshot of the counters.
    pub fn metrics(&self) -> &TickMetrics {
        &self.metrics
    }

    /// The configured (validated) rate.
    pub fn tick_rate_hz(&self) -> u32 {
        self.config.tick_rate_hz
    }

    /// Length of one tick.
    pub fn tick_duration(&self) -> Duration {
        self.tick_duration
    }
}
