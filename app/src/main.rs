#![deny(
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

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod command;
mod dialogue;

use command::{
    CommandStrategy, InfoStrategy, InitStrategy, StudyInput, StudyStrategy, VersionStrategy,
};

#[derive(Parser)]
#[command(name = "puzzler")]
#[command(
    about = "A confused student that asks you about your lecture material",
    long_about = None
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load lecture material and answer the student's questions
    Study {
        /// Lecture text pasted on the command line
        #[arg(short = 't', long)]
        text: Option<String>,

        /// File containing lecture text
        #[arg(short = 'f', long)]
        text_file: Option<PathBuf>,

        /// Lecture slides or notes as PDF
        #[arg(short = 'p', long)]
        pdf: Option<PathBuf>,

        /// Lecture recording (audio or video) to transcribe
        #[arg(short = 'V', long)]
        video: Option<PathBuf>,

        /// YouTube video link to take captions from
        #[arg(short = 'y', long)]
        youtube: Option<String>,

        /// Model to use
        #[arg(short = 'M', long)]
        model: Option<String>,

        /// Number of questions the student asks
        #[arg(short = 'n', long)]
        turns: Option<usize>,
    },
    /// Initialize configuration
    Init,
    /// Show configuration
    Info,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Study {
            text,
            text_file,
            pdf,
            video,
            youtube,
            model,
            turns,
        } => {
            StudyStrategy
                .execute(StudyInput {
                    text,
                    text_file,
                    pdf,
                    video,
                    youtube,
                    model,
                    turns,
                })
                .await
        }
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Info => InfoStrategy.execute(()).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}
