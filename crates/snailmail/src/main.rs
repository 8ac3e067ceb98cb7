//! `snailmail` - send one mail to many recipients, one copy at a time.

mod app;
mod cli;
mod settings;
mod terminal;

use anyhow::Context;
use clap::Parser;
use snailmail_core::MailSession;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::Prepared;
use cli::Cli;
use settings::Settings;
use terminal::{ConsoleObserver, TerminalInput};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(debug: bool) {
    let default_filter = if debug {
        "snailmail=debug,snailmail_core=debug,snailmail_smtp=trace"
    } else {
        "snailmail=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings_path = cli.config.clone().unwrap_or_else(Settings::default_path);
    let settings = Settings::load(&settings_path)
        .await
        .context("loading settings")?;

    let prepared = app::prepare(&cli, &settings, &mut TerminalInput, &mut std::io::stdout())
        .await
        .context("preparing mailing")?;

    let plan = match prepared {
        Prepared::Aborted => return Ok(()),
        Prepared::Send(plan) => plan,
    };

    info!(host = %plan.config.host, port = plan.config.port, "starting session");
    let total = plan.mails.len();
    let mut observer = ConsoleObserver::new(std::io::stdout());
    let report = MailSession::new(plan.config)
        .run(&plan.mails, &mut observer)
        .await
        .context("sending mail")?;

    println!("{}", app::summary(&report, total));
    Ok(())
}
