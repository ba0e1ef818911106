//! The student session state machine.
//!
//! `StudentSession` is the main entry point: it owns the question generator
//! and the session state, and exposes the four operations a front-end drives:
//! start, initial question, answer, advance.

use puzzler_core::{DEFAULT_TURN_LIMIT, QuestionGenerator, SessionError};
use tracing::{debug, info, warn};

use crate::history::ConversationLog;
use crate::session::{SessionPhase, SessionState};

/// Configuration for a student session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Maximum number of questions asked in the session
    pub turn_limit: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            turn_limit: DEFAULT_TURN_LIMIT,
        }
    }
}

impl SessionConfig {
    /// Set the turn limit. Values below one are raised to one.
    #[must_use]
    pub fn with_turn_limit(mut self, limit: usize) -> Self {
        self.turn_limit = limit.max(1);
        self
    }
}

/// A confused student asking questions about one piece of lecture material.
pub struct StudentSession<G>
where
    G: QuestionGenerator,
{
    generator: G,
    state: SessionState,
}

impl<G> StudentSession<G>
where
    G: QuestionGenerator,
{
    /// Start a session over `source_text`.
    ///
    /// Fails with [`SessionError::EmptyInput`] if the text is blank.
    pub fn start(
        generator: G,
        source_text: impl Into<String>,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        let source_text = source_text.into();
        if source_text.trim().is_empty() {
            return Err(SessionError::EmptyInput);
        }

        let state = SessionState::new(source_text, config.turn_limit.max(1));
        info!(
            "Starting student session {} at {} ({} chars of source text, {} turns)",
            state.id,
            state.started_at.to_rfc3339(),
            state.source_text.len(),
            state.turn_limit
        );

        Ok(Self { generator, state })
    }

    /// Ask the opening question. Only valid before any question exists.
    pub async fn generate_initial_question(&mut self) -> Result<String, SessionError> {
        if self.state.phase() != SessionPhase::Idle {
            return Err(SessionError::AlreadyStarted);
        }

        let question = self
            .generator
            .ask(&self.state.source_text, &[])
            .await
            .inspect_err(|e| warn!("Initial question failed: {e}"))?;

        self.record_question(question.clone());
        Ok(question)
    }

    /// Record the human's answer to the open question.
    ///
    /// Blank answers are rejected and change nothing.
    pub fn submit_answer(&mut self, answer: &str) -> Result<(), SessionError> {
        if self.state.phase() != SessionPhase::AwaitingAnswer {
            return Err(SessionError::NoOpenQuestion);
        }
        if answer.trim().is_empty() {
            return Err(SessionError::BlankAnswer);
        }

        self.state.log.answer_last(answer.to_string());
        self.state.awaiting_follow_up = self.state.has_turns_left();
        debug!(
            "Answer recorded for turn {} (follow-up due: {})",
            self.state.turn, self.state.awaiting_follow_up
        );
        if !self.state.awaiting_follow_up {
            info!(
                "Session {} finished after {} questions in {}s",
                self.state.id,
                self.state.turn,
                self.state.elapsed_seconds()
            );
        }
        Ok(())
    }

    /// Ask the next question if one is due.
    ///
    /// Returns `Ok(None)` without touching the state when no follow-up is
    /// pending or the turn limit has been reached. A failed generation leaves
    /// the follow-up pending so the call can be repeated.
    pub async fn maybe_advance(&mut self) -> Result<Option<String>, SessionError> {
        if !self.state.awaiting_follow_up || !self.state.has_turns_left() {
            return Ok(None);
        }

        let question = self
            .generator
            .ask(&self.state.source_text, self.state.log.turns())
            .await
            .inspect_err(|e| warn!("Follow-up question failed: {e}"))?;

        self.record_question(question.clone());
        self.state.awaiting_follow_up = false;
        Ok(Some(question))
    }

    fn record_question(&mut self, question: String) {
        self.state.log.push_question(question);
        self.state.turn += 1;
        info!(
            "Session {}: question {}/{} asked",
            self.state.id, self.state.turn, self.state.turn_limit
        );
    }

    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.state.phase()
    }

    #[must_use]
    pub const fn log(&self) -> &ConversationLog {
        self.state.log()
    }

    #[must_use]
    pub const fn turn(&self) -> usize {
        self.state.turn()
    }

    #[must_use]
    pub const fn turn_limit(&self) -> usize {
        self.state.turn_limit()
    }

    #[must_use]
    pub const fn is_awaiting_follow_up(&self) -> bool {
        self.state.is_awaiting_follow_up()
    }

    #[must_use]
    pub fn source_text(&self) -> &str {
        self.state.source_text()
    }

    /// The question waiting for an answer, if any.
    #[must_use]
    pub fn open_question(&self) -> Option<&str> {
        self.state.log.open_turn().map(|turn| turn.question.as_str())
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.phase() == SessionPhase::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use puzzler_core::{ConversationTurn, GenerationError};
    use std::sync::Mutex;

    /// Returns `Q1`, `Q2`, ... and remembers the history length of each call.
    #[derive(Default)]
    struct CountingGenerator {
        history_lens: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl QuestionGenerator for CountingGenerator {
        async fn ask(
            &self,
            _source_text: &str,
            history: &[ConversationTurn],
        ) -> Result<String, GenerationError> {
            let mut calls = self
                .history_lens
                .lock()
                .map_err(|e| GenerationError::Transport(e.to_string()))?;
            calls.push(history.len());
            Ok(format!("Q{}", calls.len()))
        }
    }

    #[test]
    fn config_clamps_turn_limit() {
        assert_eq!(SessionConfig::default().turn_limit, 5);
        assert_eq!(SessionConfig::default().with_turn_limit(0).turn_limit, 1);
        assert_eq!(SessionConfig::default().with_turn_limit(3).turn_limit, 3);
    }

    #[test]
    fn blank_source_is_rejected() {
        let result = StudentSession::start(
            CountingGenerator::default(),
            " \n\t ",
            SessionConfig::default(),
        );
        assert!(matches!(result, Err(SessionError::EmptyInput)));
    }

    #[tokio::test]
    async fn follow_ups_receive_full_history() -> Result<(), SessionError> {
        let mut session = StudentSession::start(
            CountingGenerator::default(),
            "Lecture",
            SessionConfig::default().with_turn_limit(3),
        )?;

        session.generate_initial_question().await?;
        session.submit_answer("A1")?;
        session.maybe_advance().await?;
        session.submit_answer("A2")?;
        session.maybe_advance().await?;

        let lens = session
            .generator
            .history_lens
            .lock()
            .map(|lens| lens.clone())
            .unwrap_or_default();
        assert_eq!(lens, vec![0, 1, 2]);
        Ok(())
    }

    #[tokio::test]
    async fn initial_question_only_once() -> Result<(), SessionError> {
        let mut session =
            StudentSession::start(CountingGenerator::default(), "Lecture", SessionConfig::default())?;

        session.generate_initial_question().await?;
        let again = session.generate_initial_question().await;
        assert!(matches!(again, Err(SessionError::AlreadyStarted)));
        assert_eq!(session.log().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn answer_without_question_is_rejected() -> Result<(), SessionError> {
        let mut session =
            StudentSession::start(CountingGenerator::default(), "Lecture", SessionConfig::default())?;

        assert!(matches!(
            session.submit_answer("early"),
            Err(SessionError::NoOpenQuestion)
        ));

        session.generate_initial_question().await?;
        session.submit_answer("A1")?;
        assert!(matches!(
            session.submit_answer("A1 again"),
            Err(SessionError::NoOpenQuestion)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn blank_answer_changes_nothing() -> Result<(), SessionError> {
        let mut session =
            StudentSession::start(CountingGenerator::default(), "Lecture", SessionConfig::default())?;
        session.generate_initial_question().await?;

        assert!(matches!(
            session.submit_answer("   "),
            Err(SessionError::BlankAnswer)
        ));
        assert_eq!(session.phase(), SessionPhase::AwaitingAnswer);
        assert!(!session.is_awaiting_follow_up());
        assert_eq!(session.open_question(), Some("Q1"));
        Ok(())
    }

    #[tokio::test]
    async fn advance_without_answer_is_noop() -> Result<(), SessionError> {
        let mut session =
            StudentSession::start(CountingGenerator::default(), "Lecture", SessionConfig::default())?;

        assert_eq!(session.maybe_advance().await?, None);
        session.generate_initial_question().await?;
        assert_eq!(session.maybe_advance().await?, None);
        assert_eq!(session.log().len(), 1);
        assert_eq!(session.turn(), 1);
        Ok(())
    }
}
