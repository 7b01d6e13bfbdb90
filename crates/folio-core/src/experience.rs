//! Experience controller
//!
//! Holds which top-level view is presented and walks each track through its
//! fixed phase order:
//!
//! ```text
//! Landing ──choose(Tech)──▶ Booting ──▶ TechContent
//!    ▲    ──choose(Space)─▶ Entry ──▶ Warp ──▶ SpaceMain
//!    └──────────── back() from any branch ─────────┘
//! ```
//!
//! The active collaborator receives a [`PhaseTicket`] and reports completion
//! by handing it back. A ticket is bound to the lifecycle epoch and stage it
//! was issued for: the first completion advances, repeats and tickets from a
//! discarded view are ignored.
//!
//! The boot sequence plays once per controller. Choosing the tech track again
//! after it has completed goes straight to the content.

use crate::error::Error;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Top-level branch chosen on the landing view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    /// Resume-style section stack
    Tech,
    /// Cinematic narrative
    Space,
}

impl FromStr for Track {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tech" => Ok(Self::Tech),
            "space" => Ok(Self::Space),
            other => Err(Error::UnknownTrack(other.to_string())),
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tech => write!(f, "tech"),
            Self::Space => write!(f, "space"),
        }
    }
}

/// Phases of the space track, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpacePhase {
    /// Title screen waiting for the visitor to engage
    Entry,
    /// Warp travel until the distance gauge fills
    Warp,
    /// The narrative sections (terminal)
    Main,
}

impl SpacePhase {
    /// Fixed phase order
    pub const ORDER: [SpacePhase; 3] = [Self::Entry, Self::Warp, Self::Main];

    /// Following phase, if any
    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Entry => Some(Self::Warp),
            Self::Warp => Some(Self::Main),
            Self::Main => None,
        }
    }
}

/// Currently presented view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum View {
    /// Track chooser
    Landing,
    /// Tech track; content is held back while `loading`
    Tech {
        /// Boot sequence still running
        loading: bool,
    },
    /// Space track at the given phase
    Space {
        /// Active phase
        phase: SpacePhase,
    },
}

/// Flat name for every distinct view value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// `View::Landing`
    Landing,
    /// `View::Tech { loading: true }`
    Booting,
    /// `View::Tech { loading: false }`
    TechContent,
    /// `View::Space { phase: Entry }`
    Entry,
    /// `View::Space { phase: Warp }`
    Warp,
    /// `View::Space { phase: Main }`
    SpaceMain,
}

impl Stage {
    /// Whether a collaborator must signal completion to leave this stage
    #[must_use]
    pub fn awaits_completion(self) -> bool {
        matches!(self, Self::Booting | Self::Entry | Self::Warp)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Landing => "landing",
            Self::Booting => "booting",
            Self::TechContent => "tech_content",
            Self::Entry => "entry",
            Self::Warp => "warp",
            Self::SpaceMain => "space_main",
        };
        f.write_str(name)
    }
}

impl View {
    /// Stage for this view
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Self::Landing => Stage::Landing,
            Self::Tech { loading: true } => Stage::Booting,
            Self::Tech { loading: false } => Stage::TechContent,
            Self::Space { phase } => match phase {
                SpacePhase::Entry => Stage::Entry,
                SpacePhase::Warp => Stage::Warp,
                SpacePhase::Main => Stage::SpaceMain,
            },
        }
    }
}

/// Sections of the tech track, top to bottom
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TechSection {
    Hero,
    Skills,
    Projects,
    Certifications,
    Contact,
    Chatbot,
}

/// Sections of the space narrative, top to bottom
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpaceSection {
    Hero,
    About,
    Education,
    Projects,
    Skills,
    Certifications,
    Mission,
    Contact,
}

/// Tech track content
pub const TECH_SECTIONS: &[TechSection] = &[
    TechSection::Hero,
    TechSection::Skills,
    TechSection::Projects,
    TechSection::Certifications,
    TechSection::Contact,
    TechSection::Chatbot,
];

/// Space narrative content
pub const SPACE_SECTIONS: &[SpaceSection] = &[
    SpaceSection::Hero,
    SpaceSection::About,
    SpaceSection::Education,
    SpaceSection::Projects,
    SpaceSection::Skills,
    SpaceSection::Certifications,
    SpaceSection::Mission,
    SpaceSection::Contact,
];

/// Sections reachable from the space navigator bar
pub const NAVIGATOR_ANCHORS: &[SpaceSection] = &[
    SpaceSection::About,
    SpaceSection::Skills,
    SpaceSection::Projects,
    SpaceSection::Education,
    SpaceSection::Certifications,
];

/// The one thing rendered for the current view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "scene", rename_all = "snake_case")]
pub enum Scene {
    /// Track chooser
    Landing,
    /// Tech boot sequence
    BootSequence,
    /// Tech content stack
    TechSections {
        /// Sections in order
        sections: &'static [TechSection],
    },
    /// Space entry gate
    EntryGate,
    /// Space warp travel
    WarpDrive,
    /// Space narrative
    SpaceSections {
        /// Sections in order
        sections: &'static [SpaceSection],
        /// Navigator anchors
        anchors: &'static [SpaceSection],
    },
}

/// One-shot completion token for the active collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhaseTicket {
    epoch: u64,
    stage: Stage,
}

impl PhaseTicket {
    /// Stage this ticket completes
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Epoch it was issued in
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// Why a request did not change the view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// Ticket belongs to a stage that is no longer active
    Stale,
    /// A track can only be chosen from the landing view
    NotOnLanding,
    /// Already on the landing view
    AlreadyOnLanding,
}

/// Result of a controller operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transition {
    /// Moved forward
    Advanced {
        /// Previous stage
        from: Stage,
        /// New stage
        to: Stage,
    },
    /// Returned to the landing view, starting a new lifecycle
    Reset {
        /// Stage that was discarded
        from: Stage,
    },
    /// Nothing changed
    Ignored {
        /// Why
        reason: IgnoreReason,
    },
}

impl Transition {
    /// Whether the view changed
    #[must_use]
    pub fn changed(&self) -> bool {
        !matches!(self, Self::Ignored { .. })
    }
}

/// Single owner of the current view
#[derive(Debug)]
pub struct ExperienceController {
    view: View,
    epoch: u64,
    visited: Vec<Stage>,
    // survives back(): the boot sequence plays once per controller
    tech_booted: bool,
}

impl Default for ExperienceController {
    fn default() -> Self {
        Self::new()
    }
}

impl ExperienceController {
    /// Start on the landing view
    #[must_use]
    pub fn new() -> Self {
        Self {
            view: View::Landing,
            epoch: 0,
            visited: vec![Stage::Landing],
            tech_booted: false,
        }
    }

    /// Current view
    #[must_use]
    pub fn view(&self) -> View {
        self.view
    }

    /// Current stage
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.view.stage()
    }

    /// Current epoch; bumps on every change
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Stages entered in the current lifecycle, in order
    #[must_use]
    pub fn visited(&self) -> &[Stage] {
        &self.visited
    }

    /// What to render now
    #[must_use]
    pub fn scene(&self) -> Scene {
        match self.stage() {
            Stage::Landing => Scene::Landing,
            Stage::Booting => Scene::BootSequence,
            Stage::TechContent => Scene::TechSections {
                sections: TECH_SECTIONS,
            },
            Stage::Entry => Scene::EntryGate,
            Stage::Warp => Scene::WarpDrive,
            Stage::SpaceMain => Scene::SpaceSections {
                sections: SPACE_SECTIONS,
                anchors: NAVIGATOR_ANCHORS,
            },
        }
    }

    /// Ticket for the active collaborator; `None` when the view is not waiting on one
    #[must_use]
    pub fn ticket(&self) -> Option<PhaseTicket> {
        let stage = self.stage();
        stage.awaits_completion().then_some(PhaseTicket {
            epoch: self.epoch,
            stage,
        })
    }

    /// Pick a track from the landing view
    pub fn choose(&mut self, track: Track) -> Transition {
        if self.view != View::Landing {
            debug!(%track, stage = %self.stage(), "Track choice ignored off landing");
            return Transition::Ignored {
                reason: IgnoreReason::NotOnLanding,
            };
        }

        let next = match track {
            Track::Tech => View::Tech {
                loading: !self.tech_booted,
            },
            Track::Space => View::Space {
                phase: SpacePhase::Entry,
            },
        };
        self.enter(next)
    }

    /// Return to the landing view, discarding the current branch
    pub fn back(&mut self) -> Transition {
        let from = self.stage();
        if from == Stage::Landing {
            return Transition::Ignored {
                reason: IgnoreReason::AlreadyOnLanding,
            };
        }

        self.view = View::Landing;
        self.epoch += 1;
        self.visited = vec![Stage::Landing];
        info!(%from, "Experience reset to landing");
        Transition::Reset { from }
    }

    /// Apply a completion signal
    pub fn complete(&mut self, ticket: PhaseTicket) -> Transition {
        if ticket.epoch != self.epoch || ticket.stage != self.stage() {
            debug!(
                ticket_stage = %ticket.stage,
                ticket_epoch = ticket.epoch,
                epoch = self.epoch,
                "Stale completion ignored"
            );
            return Transition::Ignored {
                reason: IgnoreReason::Stale,
            };
        }

        let next = match self.view {
            View::Tech { loading: true } => {
                self.tech_booted = true;
                View::Tech { loading: false }
            }
            View::Space { phase } => match phase.next() {
                Some(phase) => View::Space { phase },
                None => {
                    return Transition::Ignored {
                        reason: IgnoreReason::Stale,
                    }
                }
            },
            View::Landing | View::Tech { loading: false } => {
                return Transition::Ignored {
                    reason: IgnoreReason::Stale,
                }
            }
        };
        self.enter(next)
    }

    fn enter(&mut self, next: View) -> Transition {
        let from = self.stage();
        let to = next.stage();
        debug_assert!(
            !self.visited.contains(&to),
            "stage {to} revisited within one lifecycle"
        );

        self.view = next;
        self.epoch += 1;
        self.visited.push(to);
        info!(%from, %to, "Experience advanced");
        Transition::Advanced { from, to }
    }
}
