//! Timed collaborators for the non-terminal stages
//!
//! Each collaborator is mounted for exactly one stage and reports back with a
//! [`CompletionSignal`]. The signal is consumed by [`CompletionSignal::fire`],
//! so a collaborator can complete at most once per mount.

use crate::experience::{PhaseTicket, Stage};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Boot log lines shown while the tech track loads
pub const BOOT_LOG_LINES: &[&str] = &[
    "Establishing secure link...",
    "Decrypting core modules...",
    "Allocating neural buffers...",
    "Syncing dimensional clock...",
    "Initializing Tech_OS kernel...",
    "Loading visual assets...",
    "Calibrating scanner array...",
    "System check: 100% stable.",
];

/// Number of boot log lines kept on screen
pub const BOOT_LOG_WINDOW: usize = 5;

/// Warp distance needed to arrive
pub const WARP_DISTANCE: f64 = 100.0;

/// Distance gained per tick with no thrust
pub const WARP_BASE_SPEED: f64 = 0.2;

const WARP_RIGHT_BOOST: f64 = 0.8;
const WARP_LEFT_DRAG: f64 = 0.6;
const WARP_TURBO_BOOST: f64 = 1.5;

/// One-shot completion handle given to a mounted collaborator
#[derive(Debug)]
pub struct CompletionSignal {
    ticket: PhaseTicket,
    tx: mpsc::UnboundedSender<PhaseTicket>,
}

impl CompletionSignal {
    /// Bind a ticket to the driver's channel
    #[must_use]
    pub fn new(ticket: PhaseTicket, tx: mpsc::UnboundedSender<PhaseTicket>) -> Self {
        Self { ticket, tx }
    }

    /// Stage this signal completes
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.ticket.stage()
    }

    #[cfg(test)]
    pub(crate) fn duplicate(&self) -> Self {
        Self {
            ticket: self.ticket,
            tx: self.tx.clone(),
        }
    }

    /// Report completion
    pub fn fire(self) {
        debug!(stage = %self.ticket.stage(), "Collaborator completed");
        // The driver may already be gone; nothing to report to then.
        let _ = self.tx.send(self.ticket);
    }
}

/// A collaborator that runs while its stage is active
#[async_trait::async_trait]
pub trait PhaseCollaborator: Send + Sync {
    /// Collaborator name for logs
    fn name(&self) -> &'static str;

    /// Run until done, then fire the signal
    async fn run(&self, signal: CompletionSignal);
}

// ============================================================================
// Boot sequence (tech track)
// ============================================================================

/// Rolling window of boot log lines
#[derive(Debug, Default, Clone)]
pub struct BootLog {
    lines: VecDeque<&'static str>,
}

impl BootLog {
    /// Append a line, dropping the oldest beyond the window
    pub fn push(&mut self, line: &'static str) {
        self.lines.push_back(line);
        while self.lines.len() > BOOT_LOG_WINDOW {
            self.lines.pop_front();
        }
    }

    /// Lines currently visible, oldest first
    #[must_use]
    pub fn visible(&self) -> Vec<&'static str> {
        self.lines.iter().copied().collect()
    }
}

/// Prints the boot log, then settles and completes
#[derive(Debug, Clone)]
pub struct BootSequence {
    log_interval: Duration,
    settle: Duration,
}

impl BootSequence {
    /// Create a boot sequence
    #[must_use]
    pub fn new(log_interval: Duration, settle: Duration) -> Self {
        Self {
            log_interval,
            settle,
        }
    }

    /// Time from mount to completion
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.log_interval * BOOT_LOG_LINES.len() as u32 + self.settle
    }
}

#[async_trait::async_trait]
impl PhaseCollaborator for BootSequence {
    fn name(&self) -> &'static str {
        "boot_sequence"
    }

    async fn run(&self, signal: CompletionSignal) {
        let mut log = BootLog::default();
        for &line in BOOT_LOG_LINES {
            tokio::time::sleep(self.log_interval).await;
            log.push(line);
            info!(target: "folio::boot", "{}", line);
        }
        tokio::time::sleep(self.settle).await;
        signal.fire();
    }
}

// ============================================================================
// Entry gate (space track)
// ============================================================================

/// Waits for the visitor to engage
#[derive(Debug, Clone)]
pub struct EntryGate {
    delay: Duration,
}

impl EntryGate {
    /// Engage automatically after `delay`
    #[must_use]
    pub fn after(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait::async_trait]
impl PhaseCollaborator for EntryGate {
    fn name(&self) -> &'static str {
        "entry_gate"
    }

    async fn run(&self, signal: CompletionSignal) {
        info!("INITIALIZE SYSTEM");
        tokio::time::sleep(self.delay).await;
        signal.fire();
    }
}

// ============================================================================
// Warp drive (space track)
// ============================================================================

/// Held steering keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Thrust {
    /// Brake
    pub left: bool,
    /// Accelerate
    pub right: bool,
    /// Turbo
    pub up: bool,
}

impl Thrust {
    fn speed(self) -> f64 {
        let mut speed = WARP_BASE_SPEED;
        if self.right {
            speed += WARP_RIGHT_BOOST;
        }
        if self.left {
            speed -= WARP_LEFT_DRAG;
        }
        if self.up {
            speed += WARP_TURBO_BOOST;
        }
        speed
    }
}

/// Distance travelled towards [`WARP_DISTANCE`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WarpGauge {
    distance: f64,
}

impl WarpGauge {
    /// Current distance
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Whether the destination has been reached
    #[must_use]
    pub fn arrived(&self) -> bool {
        self.distance >= WARP_DISTANCE
    }

    /// Advance one tick. Distance never drops below zero and stops at the destination.
    pub fn tick(&mut self, thrust: Thrust) {
        if self.arrived() {
            self.distance = WARP_DISTANCE;
            return;
        }
        self.distance = (self.distance + thrust.speed()).max(0.0);
    }
}

/// Travels until the gauge fills, then completes exactly once
#[derive(Debug, Clone)]
pub struct WarpDrive {
    tick: Duration,
    thrust: Thrust,
}

impl WarpDrive {
    /// Create a warp drive ticking every `tick`
    #[must_use]
    pub fn new(tick: Duration) -> Self {
        Self {
            tick,
            thrust: Thrust::default(),
        }
    }

    /// Hold the given keys for the whole trip
    #[must_use]
    pub fn with_thrust(mut self, thrust: Thrust) -> Self {
        self.thrust = thrust;
        self
    }
}

#[async_trait::async_trait]
impl PhaseCollaborator for WarpDrive {
    fn name(&self) -> &'static str {
        "warp_drive"
    }

    async fn run(&self, signal: CompletionSignal) {
        let mut gauge = WarpGauge::default();
        // interval() panics on a zero period
        let mut interval = tokio::time::interval(self.tick.max(Duration::from_millis(1)));
        // first tick fires immediately
        interval.tick().await;

        let mut ticks: u64 = 0;
        while !gauge.arrived() {
            interval.tick().await;
            gauge.tick(self.thrust);
            ticks += 1;
        }
        info!(ticks, "Warp complete");
        signal.fire();
    }
}
