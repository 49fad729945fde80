use qq_ews_sync::{input, startup, sync};
use std::io;
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Initialize logging
    if let Err(e) = startup::init_logging() {
        eprintln!("{e:?}");
    }

    info!("QQ EWS sync started");

    let request = match input::read_request(io::stdin().lock()) {
        Ok(request) => request,
        Err(e) => {
            error!("{e}");
            if let Err(write_err) = sync::write_failure(io::stdout().lock(), &e) {
                error!("Failed to write output: {write_err}");
            }
            return ExitCode::FAILURE;
        }
    };
    info!("Read input from stdin");

    let result = match startup::load_config() {
        Ok(config) => sync::run(&request, &config).await,
        Err(e) => sync::SyncResult::assemble(&request.email, Some(&e), None),
    };

    if let Err(e) = sync::write_result(io::stdout().lock(), &result) {
        error!("Failed to write output: {e}");
        return ExitCode::FAILURE;
    }

    info!("QQ EWS sync finished");
    ExitCode::SUCCESS
}
