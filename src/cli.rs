use std::{env, path::PathBuf};

use anyhow::Context;
use chrono::Local;

use lms_deadline_sync::{
    pipeline::{self, color_for},
    storage::config::Config,
    sync::{GoogleAuthenticator, GoogleCalendarClient, Synchronizer},
};

const USAGE: &str = "Usage: lms-deadline-sync [--config PATH] [--dry-run]";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CliOptions {
    pub config_path: Option<PathBuf>,
    pub dry_run: bool,
}

pub enum CliMode {
    Run(CliOptions),
    Help,
}

pub fn parse_cli_mode<I>(args: I) -> Result<CliMode, String>
where
    I: IntoIterator<Item = String>,
{
    let mut options = CliOptions::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args
                    .next()
                    .filter(|value| !value.starts_with("--"))
                    .ok_or_else(|| "--config needs a path".to_string())?;
                options.config_path = Some(PathBuf::from(path));
            }
            "--dry-run" => {
                options.dry_run = true;
            }
            "--help" | "-h" => return Ok(CliMode::Help),
            _ => return Err(format!("Unknown argument: {}", arg)),
        }
    }

    Ok(CliMode::Run(options))
}

pub fn print_usage() {
    println!("{USAGE}");
}

pub async fn run(options: CliOptions) -> anyhow::Result<()> {
    println!("{}", Local::now());

    let config = Config::load(options.config_path.as_deref()).with_context(|| {
        let path = options.config_path.clone().unwrap_or_else(Config::config_path);
        format!("could not load config from {}", path.display())
    })?;

    let assignments = pipeline::collect_assignments(&config.portal).await?;
    let today = pipeline::today_in_tokyo();

    if options.dry_run {
        for assignment in &assignments {
            let color = color_for(assignment, today)?;
            println!("{} [{}] {:?}", assignment.date, assignment.summary(), color);
        }
        println!("Dry run: {} assignments found, calendar not modified", assignments.len());
        return Ok(());
    }

    let access_token = GoogleAuthenticator::new(config.google.clone())
        .access_token()
        .await
        .map_err(pipeline::PipelineError::from)?;
    let client = GoogleCalendarClient::new(access_token);
    let synchronizer = Synchronizer::new(client, config.calendar.id.clone());

    pipeline::sync_assignments(&synchronizer, &assignments, today).await?;
    println!("Assignment deadlines have been added to or updated in Google Calendar.");

    Ok(())
}

pub fn args() -> impl Iterator<Item = String> {
    env::args().skip(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliMode, String> {
        parse_cli_mode(args.iter().map(|a| a.to_string()))
    }

    #[test]
    fn no_arguments_runs_with_defaults() {
        match parse(&[]) {
            Ok(CliMode::Run(options)) => assert_eq!(options, CliOptions::default()),
            _ => panic!("expected run mode"),
        }
    }

    #[test]
    fn config_and_dry_run_are_parsed() {
        match parse(&["--dry-run", "--config", "/tmp/c.toml"]) {
            Ok(CliMode::Run(options)) => {
                assert!(options.dry_run);
                assert_eq!(options.config_path, Some(PathBuf::from("/tmp/c.toml")));
            }
            _ => panic!("expected run mode"),
        }
    }

    #[test]
    fn config_without_path_is_an_error() {
        assert!(parse(&["--config"]).is_err());
        assert!(parse(&["--config", "--dry-run"]).is_err());
    }

    #[test]
    fn help_flag_short_circuits() {
        assert!(matches!(parse(&["--help", "--bogus"]), Ok(CliMode::Help)));
    }

    #[test]
    fn unknown_argument_is_rejected() {
        assert_eq!(parse(&["--sample"]).err(), Some("Unknown argument: --sample".to_string()));
    }
}
