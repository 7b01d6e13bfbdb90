//! Async driver that mounts collaborators and feeds their signals to the controller
//!
//! Every change of view unmounts the previous collaborator (its task is
//! aborted and its channel dropped) and mounts the one for the new stage with
//! a fresh channel. Signals from a discarded view therefore never arrive.

use crate::collaborators::{BootSequence, CompletionSignal, EntryGate, PhaseCollaborator, WarpDrive};
use crate::error::{Error, Result};
use crate::experience::{ExperienceController, PhaseTicket, Stage, Track, Transition, View};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

/// Collaborators for each stage that awaits completion
#[derive(Clone)]
pub struct Cast {
    /// Tech boot sequence
    pub boot: Arc<dyn PhaseCollaborator>,
    /// Space entry gate
    pub entry: Arc<dyn PhaseCollaborator>,
    /// Space warp drive
    pub warp: Arc<dyn PhaseCollaborator>,
}

impl Cast {
    /// Standard collaborators with the given timings
    #[must_use]
    pub fn standard(timings: &Timings) -> Self {
        Self {
            boot: Arc::new(BootSequence::new(timings.boot_log_interval, timings.boot_settle)),
            entry: Arc::new(EntryGate::after(timings.entry_delay)),
            warp: Arc::new(WarpDrive::new(timings.warp_tick)),
        }
    }

    fn for_stage(&self, stage: Stage) -> Option<Arc<dyn PhaseCollaborator>> {
        match stage {
            Stage::Booting => Some(self.boot.clone()),
            Stage::Entry => Some(self.entry.clone()),
            Stage::Warp => Some(self.warp.clone()),
            Stage::Landing | Stage::TechContent | Stage::SpaceMain => None,
        }
    }
}

/// Collaborator timings
#[derive(Debug, Clone)]
pub struct Timings {
    /// Delay between boot log lines
    pub boot_log_interval: Duration,
    /// Pause after the last boot line
    pub boot_settle: Duration,
    /// Time before the visitor engages the entry gate
    pub entry_delay: Duration,
    /// Warp gauge tick
    pub warp_tick: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            boot_log_interval: Duration::from_millis(400),
            boot_settle: Duration::from_millis(1000),
            entry_delay: Duration::from_millis(1500),
            warp_tick: Duration::from_millis(100),
        }
    }
}

struct Mount {
    stage: Stage,
    rx: mpsc::UnboundedReceiver<PhaseTicket>,
    task: JoinHandle<()>,
}

/// Owns the controller and the currently mounted collaborator.
///
/// Must be used inside a tokio runtime: view changes spawn the next collaborator.
pub struct ExperienceDriver {
    controller: ExperienceController,
    cast: Cast,
    mount: Option<Mount>,
    view_tx: watch::Sender<View>,
}

impl ExperienceDriver {
    /// Create a driver on the landing view
    #[must_use]
    pub fn new(cast: Cast) -> Self {
        let controller = ExperienceController::new();
        let (view_tx, _) = watch::channel(controller.view());
        Self {
            controller,
            cast,
            mount: None,
            view_tx,
        }
    }

    /// Read-only access to the controller
    #[must_use]
    pub fn controller(&self) -> &ExperienceController {
        &self.controller
    }

    /// Watch view changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<View> {
        self.view_tx.subscribe()
    }

    /// Pick a track
    pub fn choose(&mut self, track: Track) -> Transition {
        let transition = self.controller.choose(track);
        self.apply(transition);
        transition
    }

    /// Return to the landing view
    pub fn back(&mut self) -> Transition {
        let transition = self.controller.back();
        self.apply(transition);
        transition
    }

    /// Wait for the mounted collaborator to complete and apply it.
    ///
    /// Returns `Ok(None)` when no collaborator is mounted.
    pub async fn step(&mut self) -> Result<Option<Transition>> {
        let Some(mount) = self.mount.as_mut() else {
            return Ok(None);
        };

        let ticket = mount
            .rx
            .recv()
            .await
            .ok_or_else(|| Error::Abandoned(mount.stage.to_string()))?;

        let transition = self.controller.complete(ticket);
        self.apply(transition);
        Ok(Some(transition))
    }

    /// Step until the view reaches a stage that awaits nothing
    pub async fn settle(&mut self) -> Result<Vec<Transition>> {
        let mut transitions = Vec::new();
        while let Some(transition) = self.step().await? {
            transitions.push(transition);
        }
        Ok(transitions)
    }

    fn apply(&mut self, transition: Transition) {
        if !transition.changed() {
            return;
        }
        self.unmount();
        self.mount_current();
        self.view_tx.send_replace(self.controller.view());
    }

    fn unmount(&mut self) {
        if let Some(mount) = self.mount.take() {
            debug!(stage = %mount.stage, "Unmounting collaborator");
            mount.task.abort();
        }
    }

    fn mount_current(&mut self) {
        let Some(ticket) = self.controller.ticket() else {
            return;
        };
        let Some(collaborator) = self.cast.for_stage(ticket.stage()) else {
            return;
        };

        let (tx, rx) = mpsc::unbounded_channel();
        let signal = CompletionSignal::new(ticket, tx);
        debug!(stage = %ticket.stage(), collaborator = collaborator.name(), "Mounting collaborator");
        let task = tokio::spawn(async move { collaborator.run(signal).await });

        self.mount = Some(Mount {
            stage: ticket.stage(),
            rx,
            task,
        });
    }
}

impl Drop for ExperienceDriver {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fires its signal twice to exercise the idempotent completion policy
    struct Stutter;

    #[async_trait::async_trait]
    impl PhaseCollaborator for Stutter {
        fn name(&self) -> &'static str {
            "stutter"
        }

        async fn run(&self, signal: CompletionSignal) {
            let again = signal.duplicate();
            signal.fire();
            again.fire();
        }
    }

    /// Never completes
    struct Stuck;

    #[async_trait::async_trait]
    impl PhaseCollaborator for Stuck {
        fn name(&self) -> &'static str {
            "stuck"
        }

        async fn run(&self, _signal: CompletionSignal) {
            std::future::pending::<()>().await;
        }
    }

    /// Drops its signal without firing
    struct Quitter;

    #[async_trait::async_trait]
    impl PhaseCollaborator for Quitter {
        fn name(&self) -> &'static str {
            "quitter"
        }

        async fn run(&self, signal: CompletionSignal) {
            drop(signal);
        }
    }

    fn fast() -> Timings {
        Timings {
            boot_log_interval: Duration::from_millis(10),
            boot_settle: Duration::from_millis(10),
            entry_delay: Duration::from_millis(10),
            warp_tick: Duration::from_millis(1),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_space_track_settles_on_main() {
        let mut driver = ExperienceDriver::new(Cast::standard(&fast()));
        let views = driver.subscribe();

        driver.choose(Track::Space);
        let transitions = driver.settle().await.unwrap();

        assert_eq!(
            transitions,
            vec![
                Transition::Advanced {
                    from: Stage::Entry,
                    to: Stage::Warp
                },
                Transition::Advanced {
                    from: Stage::Warp,
                    to: Stage::SpaceMain
                },
            ]
        );
        assert_eq!(driver.controller().stage(), Stage::SpaceMain);
        assert_eq!(views.borrow().stage(), Stage::SpaceMain);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tech_track_settles_on_content() {
        let mut driver = ExperienceDriver::new(Cast::standard(&fast()));
        driver.choose(Track::Tech);
        assert_eq!(driver.controller().view(), View::Tech { loading: true });

        driver.settle().await.unwrap();
        assert_eq!(driver.controller().view(), View::Tech { loading: false });
        assert!(driver.step().await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_signal_advances_once() {
        let stutter: Arc<dyn PhaseCollaborator> = Arc::new(Stutter);
        let cast = Cast {
            boot: stutter.clone(),
            entry: stutter,
            warp: Arc::new(Stuck),
        };
        let mut driver = ExperienceDriver::new(cast);
        driver.choose(Track::Space);

        let first = driver.step().await.unwrap();
        assert_eq!(
            first,
            Some(Transition::Advanced {
                from: Stage::Entry,
                to: Stage::Warp
            })
        );
        // the duplicate went to the unmounted entry channel and is gone
        assert_eq!(driver.controller().stage(), Stage::Warp);
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_unmounts_pending_collaborator() {
        let cast = Cast {
            boot: Arc::new(Stuck),
            entry: Arc::new(Stuck),
            warp: Arc::new(Stuck),
        };
        let mut driver = ExperienceDriver::new(cast);
        driver.choose(Track::Tech);
        assert_eq!(driver.back(), Transition::Reset { from: Stage::Booting });
        assert!(driver.step().await.unwrap().is_none());
        assert_eq!(driver.controller().view(), View::Landing);
    }

    #[tokio::test]
    async fn test_abandoned_collaborator_is_reported() {
        let cast = Cast {
            boot: Arc::new(Quitter),
            entry: Arc::new(Stuck),
            warp: Arc::new(Stuck),
        };
        let mut driver = ExperienceDriver::new(cast);
        driver.choose(Track::Tech);

        match driver.step().await {
            Err(Error::Abandoned(stage)) => assert_eq!(stage, "booting"),
            other => panic!("expected Abandoned, got {:?}", other),
        }
    }
}
