#![warn(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Turn-by-turn conversation between the simulated student and a human.
//!
//! The student asks an opening question on request, then one follow-up after
//! every answer until the turn limit is reached.
//!
//! # Key Features
//! - Explicit session state, no ambient globals
//! - Typed generation failures that leave the state untouched
//! - Configurable turn limit (5 by default)

mod history;
mod manager;
mod session;

pub use history::ConversationLog;
pub use manager::{SessionConfig, StudentSession};
pub use session::{SessionPhase, SessionState};
