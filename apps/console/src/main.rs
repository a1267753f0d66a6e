//! Rentdesk administration console.

#![forbid(unsafe_code)]

mod commands;
mod console_config;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use rentdesk_application::{SessionService, UserNotice};
use rentdesk_core::{AppError, AppResult};
use rentdesk_infrastructure::{FileTokenStore, JwtTokenDecoder};
use tracing::debug;

use commands::{Cli, Command, Console, print_notice};
use console_config::{ConsoleConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    report(run(cli.command).await)
}

/// Prints a failure once as a notice and maps the outcome to an exit code.
fn report(result: AppResult<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            print_notice(&UserNotice::from_error(&error));
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> AppResult<()> {
    let config = ConsoleConfig::load()?;
    let http_client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

    let session = SessionService::new(
        Arc::new(FileTokenStore::new(config.token_path.clone())),
        Arc::new(JwtTokenDecoder::new()),
    );
    if !matches!(command, Command::Login { .. })
        && let Some(identity) = session.restore().await?
    {
        debug!(subject = %identity.subject(), "session restored");
    }

    let console = Console {
        config,
        http_client,
        session,
    };

    console.run(command).await
}

#[cfg(test)]
mod tests {
    use std::process::ExitCode;

    use rentdesk_core::AppError;

    use super::report;

    #[test]
    fn failures_map_to_failure_exit_code() {
        assert_eq!(report(Ok(())), ExitCode::SUCCESS);
        assert_eq!(
            report(Err(AppError::Api {
                code: 1007,
                message: "Role not found".to_owned(),
            })),
            ExitCode::FAILURE
        );
    }
}
