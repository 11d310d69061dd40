//! Sequencing of the Anima diffusion preprocessing tools.
//!
//! The gradients of a run are reconstructed first, then each stage hands its output
//! image (and gradients) to the next through a [state::PipelineState]. Intermediates
//! live in a scratch [workspace::Workspace]; final artifacts are published beside the
//! input only once tensor estimation succeeded.

pub mod args;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod stage;
pub mod state;
pub mod tools;
pub mod workspace;

pub use error::PipelineError;

use tracing::Level;

/// fmt subscriber at INFO, DEBUG when verbose
pub fn init_logging(verbose:bool) {
    let level = if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    if let Err(e) = tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(level)
            .finish(),
    ) {
        eprintln!("[ERROR] could not set up logging: {}", e);
    }
}
