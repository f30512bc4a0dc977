pub mod config;
pub mod models;
pub mod pipeline;

pub use pipeline::processor::{LegalPipeline, PipelineError, PipelineStage, UsageReport};

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. `RUST_LOG` overrides the default filter.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .try_init();

    tracing::debug!("NyayMitra pipeline v{}", config::APP_VERSION);
}
