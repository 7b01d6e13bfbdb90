//! Visitor-side chat session
//!
//! Keeps the transcript shown to the visitor and turns each new message into
//! a [`ChatRequest`] carrying the prior conversation as history.

use folio_relay::{ChatRequest, ChatResponse, ConversationMessage};
use serde::Serialize;
use tracing::debug;

/// Shown when the relay cannot be reached at all
pub const SEVERED_NOTICE: &str = "Connection severed. verifying local protocols...";

/// Who wrote a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// The visitor
    Visitor,
    /// The assistant persona
    Guardian,
}

/// One line of the transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptEntry {
    /// Author
    pub speaker: Speaker,
    /// Text as displayed
    pub content: String,
}

impl TranscriptEntry {
    fn to_message(&self) -> ConversationMessage {
        match self.speaker {
            Speaker::Visitor => ConversationMessage::user(self.content.clone()),
            Speaker::Guardian => ConversationMessage::assistant(self.content.clone()),
        }
    }
}

/// Transcript plus the in-flight flag
#[derive(Debug, Default, Clone)]
pub struct ChatSession {
    transcript: Vec<TranscriptEntry>,
    loading: bool,
}

impl ChatSession {
    /// Empty session
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries so far, oldest first
    #[must_use]
    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    /// Whether a request is in flight
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Start a turn.
    ///
    /// Returns `None` for blank input or while a previous turn is still in
    /// flight. Otherwise records the visitor entry and builds the request,
    /// whose history is everything said before this message.
    pub fn begin(&mut self, input: &str) -> Option<ChatRequest> {
        let message = input.trim();
        if message.is_empty() || self.loading {
            debug!(loading = self.loading, "Chat input rejected");
            return None;
        }

        let history = self.transcript.iter().map(TranscriptEntry::to_message).collect();
        self.transcript.push(TranscriptEntry {
            speaker: Speaker::Visitor,
            content: message.to_string(),
        });
        self.loading = true;

        Some(ChatRequest::new(message).with_history(history))
    }

    /// Record the relay's answer
    pub fn finish(&mut self, response: ChatResponse) {
        let content = match response {
            ChatResponse::Reply { text } => text,
            ChatResponse::Failure { error, details, .. } => match details {
                Some(details) => format!("System Alert: {}. {}", error, details),
                None => format!("System Alert: {}.", error),
            },
        };
        self.answer(content);
    }

    /// Record that the relay could not be reached
    pub fn sever(&mut self) {
        self.answer(SEVERED_NOTICE.to_string());
    }

    fn answer(&mut self, content: String) {
        self.transcript.push(TranscriptEntry {
            speaker: Speaker::Guardian,
            content,
        });
        self.loading = false;
    }
}
