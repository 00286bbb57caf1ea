mod args;

use crate::args::{CheckDigitAction, CheckDigitArgs, Cli, Command};
use anyhow::{Context, Result, bail};
use clap::Parser;
use psn::PseudonymService;
use psn::domain::config::ServiceConfig;
use psn::domain::constants::DEFAULT_ALPHABET;
use psn::hierarchy::{DomainPathFinder, DomainReader};
use psn::kernel::config::load_config;
use psn::pseudonym::{append_check_digit, validate_check_digit};
use psn_logger::Logger;
use serde::Serialize;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::debug;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config: ServiceConfig =
        load_config(cli.config.as_deref()).context("Critical: Configuration is malformed")?;
    let _log = Logger::from_config(&config.logging)?;

    match cli.command {
        Command::CheckDigit { action } => check_digit(&action),
        command => {
            let service = PseudonymService::init(&config).await?;
            run(&service, command).await
        },
    }
}

async fn run(service: &PseudonymService, command: Command) -> Result<ExitCode> {
    match command {
        Command::Domains => print_json(&service.catalog().list())?,
        Command::Resolve { domain } => {
            let resolver = service.pseudonymizer().resolver();
            let config = resolver.resolve_by_name(service.catalog(), &domain)?;
            print_json(&config)?;
        },
        Command::Issue { domain, identifier, id_type } => {
            let issued = service.pseudonymizer().issue(&domain, &identifier, &id_type).await?;
            print_json(&issued)?;
        },
        Command::Path { from, to } => {
            let domains = service.catalog().domains();
            let Some(path) = DomainPathFinder::new(&domains).find_path(&from, &to) else {
                bail!("No path between {from} and {to}");
            };
            let names: Vec<&str> = path.iter().map(|d| d.name.as_str()).collect();
            writeln!(io::stdout().lock(), "{}", names.join(" -> "))?;
        },
        Command::CheckDigit { action } => return check_digit(&action),
    }
    Ok(ExitCode::SUCCESS)
}

fn check_digit(action: &CheckDigitAction) -> Result<ExitCode> {
    let mut out = io::stdout().lock();
    match action {
        CheckDigitAction::Append(args) => {
            let Some(appended) =
                append_check_digit(&args.value, &args.algorithm, alphabet(args), &args.prefix)?
            else {
                bail!("Value holds characters outside the check digit alphabet");
            };
            writeln!(out, "{appended}")?;
            Ok(ExitCode::SUCCESS)
        },
        CheckDigitAction::Validate(args) => {
            let verdict =
                validate_check_digit(&args.value, &args.algorithm, alphabet(args), &args.prefix)?;
            debug!(?verdict, "Check digit validated");
            let (label, code) = match verdict {
                Some(true) => ("valid", ExitCode::SUCCESS),
                Some(false) => ("invalid", ExitCode::FAILURE),
                None => ("unverifiable", ExitCode::from(2)),
            };
            writeln!(out, "{label}")?;
            Ok(code)
        },
    }
}

fn alphabet(args: &CheckDigitArgs) -> &str {
    args.alphabet.as_deref().unwrap_or(DEFAULT_ALPHABET)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}
