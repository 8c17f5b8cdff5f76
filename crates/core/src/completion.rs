use std::collections::HashMap;

use thiserror::Error;

use crate::model::{ChapterId, ContentId, Course};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CompletionError {
    #[error("content {content_id} not found in chapter {chapter_id}")]
    UnknownContent {
        chapter_id: ChapterId,
        content_id: ContentId,
    },

    #[error("content {0} is already completed")]
    AlreadyCompleted(ContentId),

    #[error("content {0} is locked")]
    Locked(ContentId),

    #[error("a completion request for content {0} is already in flight")]
    InFlight(ContentId),
}

//
// ─── MUTATION STATE ────────────────────────────────────────────────────────────
//

/// Lifecycle of a single client-initiated mutation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MutationState {
    #[default]
    Idle,
    Pending,
    Confirmed,
    Failed(String),
}

impl MutationState {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

//
// ─── TRACKER ───────────────────────────────────────────────────────────────────
//

/// Handle for one in-flight completion request.
///
/// Carries the tracker generation it was issued under so a response that
/// arrives after the snapshot was reloaded is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionTicket {
    pub chapter_id: ChapterId,
    pub content_id: ContentId,
    generation: u64,
}

/// What happened when a response was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Applied,
    /// The ticket belongs to a previous snapshot; nothing changed.
    Stale,
}

/// Per-content completion requests against one course snapshot.
#[derive(Debug, Clone, Default)]
pub struct CompletionTracker {
    generation: u64,
    states: HashMap<ContentId, MutationState>,
}

impl CompletionTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Drop all request state; outstanding tickets become stale.
    pub fn reset(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.states.clear();
    }

    #[must_use]
    pub fn state(&self, content_id: ContentId) -> &MutationState {
        static IDLE: MutationState = MutationState::Idle;
        self.states.get(&content_id).unwrap_or(&IDLE)
    }

    /// Start a completion request.
    ///
    /// # Errors
    ///
    /// Returns `CompletionError::UnknownContent` if the content is not in the snapshot.
    /// Returns `CompletionError::AlreadyCompleted` if the content is already done.
    /// Returns `CompletionError::Locked` if the content is locked.
    /// Returns `CompletionError::InFlight` if a request is already pending.
    pub fn begin(
        &mut self,
        course: &Course,
        chapter_id: ChapterId,
        content_id: ContentId,
    ) -> Result<CompletionTicket, CompletionError> {
        let item = course
            .content(chapter_id, content_id)
            .ok_or(CompletionError::UnknownContent {
                chapter_id,
                content_id,
            })?;
        if item.completed {
            return Err(CompletionError::AlreadyCompleted(content_id));
        }
        if item.locked {
            return Err(CompletionError::Locked(content_id));
        }
        if self.state(content_id).is_pending() {
            return Err(CompletionError::InFlight(content_id));
        }

        self.states.insert(content_id, MutationState::Pending);
        Ok(CompletionTicket {
            chapter_id,
            content_id,
            generation: self.generation,
        })
    }

    /// The backend accepted the request: flip the local flag to completed.
    pub fn confirm(&mut self, course: &mut Course, ticket: &CompletionTicket) -> Applied {
        if ticket.generation != self.generation {
            return Applied::Stale;
        }
        if let Some(item) = course.content_mut(ticket.chapter_id, ticket.content_id) {
            item.completed = true;
        }
        self.states
            .insert(ticket.content_id, MutationState::Confirmed);
        Applied::Applied
    }

    /// The request failed; the content stays incomplete and can be retried.
    pub fn fail(&mut self, ticket: &CompletionTicket, reason: impl Into<String>) -> Applied {
        if ticket.generation != self.generation {
            return Applied::Stale;
        }
        self.states
            .insert(ticket.content_id, MutationState::Failed(reason.into()));
        Applied::Applied
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
