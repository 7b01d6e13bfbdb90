//! Folio Core - Experience sequencing
//!
//! This crate provides the visitor-facing logic of the folio portfolio:
//! - Experience: the view state machine (landing, tech track, space track)
//! - Collaborators: timed phases (boot sequence, entry gate, warp drive)
//! - Driver: mounts collaborators and applies their completion signals
//! - Chat: visitor transcript and request building for the relay

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod chat;
pub mod collaborators;
pub mod driver;
pub mod error;
pub mod experience;

pub use chat::{ChatSession, Speaker, TranscriptEntry, SEVERED_NOTICE};
pub use collaborators::{
    BootLog, BootSequence, CompletionSignal, EntryGate, PhaseCollaborator, Thrust, WarpDrive,
    WarpGauge, BOOT_LOG_LINES, BOOT_LOG_WINDOW, WARP_BASE_SPEED, WARP_DISTANCE,
};
pub use driver::{Cast, ExperienceDriver, Timings};
pub use error::{Error, Result};
pub use experience::{
    ExperienceController, IgnoreReason, PhaseTicket, Scene, SpacePhase, SpaceSection, Stage,
    TechSection, Track, Transition, View, NAVIGATOR_ANCHORS, SPACE_SECTIONS, TECH_SECTIONS,
};
