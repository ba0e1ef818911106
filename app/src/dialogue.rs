//! Terminal front-end for a student session.
//!
//! Reads answers line by line and prints each question as it arrives. Input
//! and output are generic so the loop can be driven from tests.

use std::io::{BufRead, Write};

use puzzler_conversation::{SessionPhase, StudentSession};
use puzzler_core::QuestionGenerator;
use tracing::debug;

const QUIT_COMMANDS: [&str; 3] = ["exit", "quit", "q"];

/// A question-and-answer exchange between the student and the user.
pub struct Dialogue<G, R, W>
where
    G: QuestionGenerator,
{
    session: StudentSession<G>,
    input: R,
    output: W,
}

impl<G, R, W> Dialogue<G, R, W>
where
    G: QuestionGenerator,
    R: BufRead,
    W: Write,
{
    pub const fn new(session: StudentSession<G>, input: R, output: W) -> Self {
        Self {
            session,
            input,
            output,
        }
    }

    #[cfg(test)]
    pub fn into_parts(self) -> (StudentSession<G>, W) {
        (self.session, self.output)
    }

    /// Run until the student is out of questions or the user quits.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        debug!(
            "Source text has {} characters",
            self.session.source_text().chars().count()
        );
        writeln!(self.output, "Lecture text loaded.")?;
        writeln!(
            self.output,
            "Type 'exit', 'quit' or 'q' at a '>' prompt to end the session.\n"
        )?;

        if !self.ask_initial_question().await? {
            return self.farewell();
        }

        loop {
            match self.session.phase() {
                SessionPhase::AwaitingAnswer => {
                    if !self.collect_answer()? {
                        return self.farewell();
                    }
                }
                SessionPhase::AwaitingFollowUp => {
                    if !self.ask_follow_up().await? {
                        return self.farewell();
                    }
                }
                SessionPhase::Done | SessionPhase::Idle => break,
            }
        }

        writeln!(
            self.output,
            "\nThat's all I wanted to ask. Thanks for explaining!"
        )?;
        self.print_transcript()?;
        Ok(())
    }

    /// Returns `false` if the user quit before a question was produced.
    async fn ask_initial_question(&mut self) -> anyhow::Result<bool> {
        loop {
            writeln!(
                self.output,
                "Press Enter to hear the student's first question."
            )?;
            if self.read_command("> ")?.is_none() {
                return Ok(false);
            }

            writeln!(self.output, "Thinking...")?;
            match self.session.generate_initial_question().await {
                Ok(question) => {
                    self.print_question(&question)?;
                    return Ok(true);
                }
                Err(e) => writeln!(self.output, "{e}")?,
            }
        }
    }

    /// Returns `false` at end of input. Answers are never read as commands.
    fn collect_answer(&mut self) -> anyhow::Result<bool> {
        let Some(answer) = self.read_line("Your answer: ")? else {
            return Ok(false);
        };
        if answer.is_empty() {
            return Ok(true);
        }

        if let Err(e) = self.session.submit_answer(&answer) {
            writeln!(self.output, "{e}")?;
        }
        Ok(true)
    }

    /// Returns `false` if the user quit instead of retrying a failed question.
    async fn ask_follow_up(&mut self) -> anyhow::Result<bool> {
        writeln!(self.output, "Thinking...")?;
        match self.session.maybe_advance().await {
            Ok(Some(question)) => self.print_question(&question)?,
            Ok(None) => debug!("No follow-up due"),
            Err(e) => {
                writeln!(self.output, "{e}")?;
                writeln!(self.output, "Press Enter to try again.")?;
                if self.read_command("> ")?.is_none() {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    /// Read one trimmed line. `None` on end of input.
    fn read_line(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Like [`Self::read_line`], but a quit command also yields `None`.
    fn read_command(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        Ok(self
            .read_line(prompt)?
            .filter(|line| !QUIT_COMMANDS.contains(&line.as_str())))
    }

    fn print_question(&mut self, question: &str) -> anyhow::Result<()> {
        writeln!(self.output, "\nQ{}: {question}\n", self.session.turn())?;
        Ok(())
    }

    fn print_transcript(&mut self) -> anyhow::Result<()> {
        writeln!(self.output, "\n=== Conversation ===")?;
        for (i, turn) in self.session.log().turns().iter().enumerate() {
            writeln!(self.output, "Q{}: {}", i + 1, turn.question)?;
            writeln!(self.output, "A{}: {}", i + 1, turn.answer)?;
        }
        Ok(())
    }

    fn farewell(&mut self) -> anyhow::Result<()> {
        writeln!(
            self.output,
            "\nSession ended after {} question(s).",
            self.session.turn()
        )?;
        Ok(())
    }
}
