use std::io::Write;

use anyhow::{bail, Context, Result};
use quotawarn_core::{FileStateStore, StateStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use quotawarn::config::{Command, Config, Settings};
use quotawarn::formatter::PlainText;
use quotawarn::input::AccountUsage;
use quotawarn::report::{write_report, Colors};
use quotawarn::runner;

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Config::parse_args();

    // Setup logging
    setup_logging(cli.debug);

    // Load settings
    let mut settings = Settings::load(cli.config.as_ref())?;
    settings.merge_cli(&cli);
    settings.validate();

    if let Some(Command::State { account, resource }) = &cli.command {
        return print_state(&settings, account, resource);
    }

    let Some(input) = &cli.input else {
        bail!("no usage file given (use --input <FILE>)");
    };
    let usage = AccountUsage::load(input)?;
    let outcome = runner::run(&settings, &usage, &PlainText, cli.dry_run)?;

    let colors = Colors::new(settings.report.color);
    let mut out = std::io::stdout().lock();
    for report in &outcome.reports {
        write_report(&mut out, &colors, report, &PlainText)?;
        writeln!(out)?;
    }
    out.flush()?;

    if !outcome.rejected.is_empty() {
        let names: Vec<&str> = outcome.rejected.iter().map(|(r, _)| r.as_str()).collect();
        bail!("misconfigured resources skipped: {}", names.join(", "));
    }
    Ok(())
}

fn print_state(settings: &Settings, account: &str, resource: &str) -> Result<()> {
    let store = FileStateStore::new(&settings.state_dir, account, resource)?;
    let state = store
        .load()
        .with_context(|| format!("Failed to load state from {:?}", store.path()))?;
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}

fn setup_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("quotawarn=debug,quotawarn_core=debug")
    } else {
        EnvFilter::new("quotawarn=info,quotawarn_core=info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
