mod cli;
mod logging;

use std::path::Path;

use anyhow::{bail, Context};
use clap::Parser;
use hsp::config::BrowserBuilder;
use hsp::{
    BookingConfig, BookingOrchestrator, BookingStatus, BrowsingSession, ChromeEngine, Credentials,
    Engine,
};
use tracing::error;

use crate::cli::{Cli, Commands};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    if let Err(err) = run(cli).await {
        error!(error = %err, "command failed");
        eprintln!("[!] {err:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut browser = ChromeEngine::builder()
        .kind(cli.browser.into())
        .headless(!cli.headed);
    if let Some(path) = cli.browser_path {
        browser = browser.browser_path(path);
    }

    match cli.command {
        Commands::CheckCredentials { credentials } => check_credentials(&credentials),
        Commands::CourseStatus { course } => course_status(browser, &course).await,
        Commands::Booking {
            credentials,
            course,
            booking_out,
            overwrite,
            keep_open,
        } => {
            if booking_out.exists() && !overwrite {
                bail!(
                    "{} already exists; pass --overwrite or choose another --booking-out",
                    booking_out.display()
                );
            }
            let credentials = Credentials::from_path(&credentials)
                .with_context(|| format!("loading {}", credentials.display()))?;
            booking(browser, &course, &credentials, &booking_out, keep_open).await
        }
    }
}

fn check_credentials(path: &Path) -> anyhow::Result<()> {
    println!("[*] HSP Credential-File Checking");
    match Credentials::from_path(path) {
        Ok(credentials) => {
            println!(
                "Credentials are most likely O.K. :) ({} {}, {})",
                credentials.name, credentials.surname, credentials.status
            );
            Ok(())
        }
        Err(err) => {
            println!("{err}");
            bail!("INVALID CREDENTIALS")
        }
    }
}

async fn course_status(browser: BrowserBuilder, course_id: &str) -> anyhow::Result<()> {
    println!("[*] HSP Course Status");
    let engine = browser.build().await?;
    let mut orchestrator =
        BookingOrchestrator::new(BrowsingSession::new(engine).await?, BookingConfig::default());

    let lookup = orchestrator.lookup(course_id).await;
    let closed = orchestrator.into_session().into_engine().close().await;
    let course = settle(lookup, closed.map_err(Into::into))?;

    println!("{course}");
    match (course.status(), course.status_reason()) {
        (BookingStatus::Closed, Some(reason)) => println!("{} ({reason})", course.status()),
        (status, _) => println!("{status}"),
    }
    Ok(())
}

async fn booking(
    browser: BrowserBuilder,
    course_id: &str,
    credentials: &Credentials,
    destination: &Path,
    keep_open: bool,
) -> anyhow::Result<()> {
    println!("[*] HSP Course Booking");
    let engine = browser.build().await?;
    let mut orchestrator =
        BookingOrchestrator::new(BrowsingSession::new(engine).await?, BookingConfig::default());

    let result = async {
        let course = orchestrator.lookup(course_id).await?;
        println!("{course}");
        orchestrator
            .book(&course, credentials, Some(destination))
            .await
    }
    .await;

    if let Ok(ref receipt) = result {
        println!("Booked. Confirmation saved to {}", receipt.artifact.display());
    }

    let mut engine = orchestrator.into_session().into_engine();
    let waited = if keep_open {
        println!("Browser left open, press Ctrl-C to close it.");
        tokio::signal::ctrl_c().await
    } else {
        Ok(())
    };
    let closed = engine.close().await;

    let teardown = waited
        .map_err(anyhow::Error::from)
        .and_then(|()| closed.map_err(anyhow::Error::from));
    settle(result, teardown)?;
    Ok(())
}

/// Outcome of a browser command after teardown. The command's own error
/// wins over a teardown error.
fn settle<T>(outcome: hsp::Result<T>, teardown: anyhow::Result<()>) -> anyhow::Result<T> {
    let value = outcome?;
    teardown?;
    Ok(value)
}
