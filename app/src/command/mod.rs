//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy with its own input type, dispatched
//! statically from `main`.

mod info;
mod init;
mod study;
mod version;

pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use study::{StudyInput, StudyStrategy};
pub use version::VersionStrategy;

/// Contract shared by every command strategy.
///
/// Each strategy names its own input via the associated type, so arguments
/// are passed without casting or boxing.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}
