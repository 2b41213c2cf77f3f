use std::process::ExitCode;

use lms_deadline_sync::{pipeline::PipelineError, storage::config::Config};
use tracing_subscriber::EnvFilter;

mod cli;
use cli::{CliMode, args, parse_cli_mode, print_usage, run};

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();

    let options = match parse_cli_mode(args()) {
        Ok(CliMode::Run(options)) => options,
        Ok(CliMode::Help) => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            print_usage();
            return ExitCode::from(2);
        }
    };

    match run(options).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(PipelineError::LoginFailed(cause)) = err.downcast_ref::<PipelineError>() {
                eprintln!("Login failed, nothing was synced: {}", cause);
            } else {
                eprintln!("Error: {:#}", err);
            }
            tracing::error!("Run aborted: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn setup_logging() {
    let log_dir = Config::config_dir();

    std::fs::create_dir_all(&log_dir).ok();

    let file_appender = tracing_appender::rolling::daily(log_dir, "lms-deadline-sync.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_ansi(false)
        .with_target(false)
        .init();

    std::mem::forget(_guard);

    tracing::info!("lms-deadline-sync started");
}
