//! State owned by a single student session.
//!
//! Holds the source text, the conversation log, the turn counter and the
//! follow-up flag. Nothing here outlives the session.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::history::ConversationLog;

/// Where the session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No question asked yet.
    Idle,
    /// The last question has no answer.
    AwaitingAnswer,
    /// The last question was answered and a follow-up is due.
    AwaitingFollowUp,
    /// The turn limit was reached and the last question was answered.
    Done,
}

/// Complete state of a conversation session.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Session identifier, used for logging
    pub id: Uuid,
    /// Start timestamp, reported when the session starts and ends
    pub started_at: DateTime<Utc>,
    pub(crate) source_text: String,
    pub(crate) log: ConversationLog,
    pub(crate) turn: usize,
    pub(crate) awaiting_follow_up: bool,
    pub(crate) turn_limit: usize,
}

impl SessionState {
    pub(crate) fn new(source_text: String, turn_limit: usize) -> Self {
        Self {
            id: Uuid::now_v7(),
            started_at: Utc::now(),
            source_text,
            log: ConversationLog::new(),
            turn: 0,
            awaiting_follow_up: false,
            turn_limit,
        }
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.log.is_empty() {
            SessionPhase::Idle
        } else if self.log.open_turn().is_some() {
            SessionPhase::AwaitingAnswer
        } else if self.awaiting_follow_up {
            SessionPhase::AwaitingFollowUp
        } else {
            SessionPhase::Done
        }
    }

    #[must_use]
    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    #[must_use]
    pub const fn log(&self) -> &ConversationLog {
        &self.log
    }

    /// Number of questions generated so far.
    #[must_use]
    pub const fn turn(&self) -> usize {
        self.turn
    }

    #[must_use]
    pub const fn turn_limit(&self) -> usize {
        self.turn_limit
    }

    #[must_use]
    pub const fn is_awaiting_follow_up(&self) -> bool {
        self.awaiting_follow_up
    }

    #[must_use]
    pub const fn has_turns_left(&self) -> bool {
        self.turn < self.turn_limit
    }

    /// Whole seconds since the session started.
    #[must_use]
    pub fn elapsed_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_is_idle() {
        let state = SessionState::new("text".to_string(), 5);
        assert_eq!(state.phase(), SessionPhase::Idle);
        assert_eq!(state.turn(), 0);
        assert!(state.log().is_empty());
        assert!(!state.is_awaiting_follow_up());
        assert!(state.has_turns_left());
    }

    #[test]
    fn phase_follows_log_and_flag() {
        let mut state = SessionState::new("text".to_string(), 1);
        state.log.push_question("Q1".to_string());
        state.turn = 1;
        assert_eq!(state.phase(), SessionPhase::AwaitingAnswer);

        state.log.answer_last("A1".to_string());
        assert_eq!(state.phase(), SessionPhase::Done);

        state.awaiting_follow_up = true;
        assert_eq!(state.phase(), SessionPhase::AwaitingFollowUp);
    }

    #[test]
    fn elapsed_time_counts_from_start() {
        let mut state = SessionState::new("text".to_string(), 5);
        assert!(state.started_at <= Utc::now());
        assert_eq!(state.elapsed_seconds(), 0);

        state.started_at -= chrono::Duration::seconds(90);
        assert!((90..92).contains(&state.elapsed_seconds()));
    }
}
