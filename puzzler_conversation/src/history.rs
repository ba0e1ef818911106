//! Chronological record of questions and answers.

use puzzler_core::ConversationTurn;

/// Ordered list of turns, oldest first.
///
/// Only two mutations exist: appending a new open question, and filling in
/// the answer of the last turn. At most one turn (the last) is unanswered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationLog {
    turns: Vec<ConversationTurn>,
}

impl ConversationLog {
    #[must_use]
    pub const fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Append a question with an empty answer.
    ///
    /// Returns `false` and leaves the log alone if the last turn is still open.
    pub fn push_question(&mut self, question: String) -> bool {
        if self.open_turn().is_some() {
            return false;
        }
        self.turns.push(ConversationTurn::open(question));
        true
    }

    /// Fill in the answer of the open turn, keeping its position.
    ///
    /// Returns `false` if there is no open turn.
    pub fn answer_last(&mut self, answer: String) -> bool {
        match self.turns.last_mut() {
            Some(turn) if !turn.is_answered() => {
                turn.answer = answer;
                true
            }
            _ => false,
        }
    }

    /// The last turn, if it has no answer yet.
    #[must_use]
    pub fn open_turn(&self) -> Option<&ConversationTurn> {
        self.turns.last().filter(|turn| !turn.is_answered())
    }

    #[must_use]
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Number of turns without an answer; never more than one.
    #[must_use]
    pub fn unanswered_count(&self) -> usize {
        self.turns.iter().filter(|turn| !turn.is_answered()).count()
    }
}
