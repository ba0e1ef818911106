//! Prompt construction for the confused-student role-play.

use crate::ConversationTurn;

const INSTRUCTIONS: &str = "You are a confused student trying to understand the following content. \
Generate an intellectual question that expresses misunderstanding or confusion that would be raised \
by a uniquely talented student. But make sure it sounds like a student talking, no need for \
unnecessary complex words or phrases. It should sound like a natural, casual conversation and not \
an AI bot speaking. Ask good questions in a simple manner. Feel free to use the following \
conversation history (if any), in case you want to generate a follow up based on that. If the \
answer was not up to the standards of clarity, you can also repeat a question from the history.";

/// Render turns as `Q: ...` / `A: ...` lines.
#[must_use]
pub fn format_history(history: &[ConversationTurn]) -> String {
    history
        .iter()
        .map(|turn| format!("Q: {}\nA: {}", turn.question, turn.answer))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Full prompt: instructions, history, then the lecture text verbatim.
#[must_use]
pub fn build_confused_student_prompt(source_text: &str, history: &[ConversationTurn]) -> String {
    format!(
        "{INSTRUCTIONS}\nConversation history:\n{}\nContent:\n{source_text}\nQ:",
        format_history(history)
    )
}
