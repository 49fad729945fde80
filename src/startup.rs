use crate::config::Config;
use crate::error::{other_error, AppResult};
use std::sync::Once;
use tracing::error;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Filter used when RUST_LOG is not set
const DEFAULT_LOG_FILTER: &str = "info,reqwest=warn,hyper_util=warn";

static LOGGING: Once = Once::new();

/// Initialize logging to stderr; later calls are no-ops
pub fn init_logging() -> miette::Result<()> {
    let mut result: AppResult<()> = Ok(());

    LOGGING.call_once(|| {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
            )
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .with_target(false)
            .with_file(true)
            .with_line_number(true)
            .finish();

        result = tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| other_error(&format!("Failed to set up logging: {e}")));
    });

    result?;
    Ok(())
}

/// Load the application config
pub fn load_config() -> AppResult<Config> {
    Config::load().inspect_err(|e| error!("Failed to load configuration: {e:?}"))
}
