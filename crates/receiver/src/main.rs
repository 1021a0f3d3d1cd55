use std::process::ExitCode;
use std::time::Duration;

use tracing::error;

use stdin_receiver::runtime::{boot, run};

/// Bound on waiting for a blocking stdin read when the runtime is dropped.
const RUNTIME_SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(500);

fn main() -> ExitCode {
    let Ok(config) = boot::boot() else {
        return ExitCode::FAILURE;
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to build tokio runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(run::run(&config));
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_TIMEOUT);

    match result {
        Ok(outcome) if outcome.is_failure() => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Receiver failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
