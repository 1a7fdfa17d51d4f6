//! data-cuaca binary
//!
//! Thin CLI wrapper around the library. Parses arguments, performs one fetch
//! via `data_cuaca::run`, and maps the outcome to an exit code.

use std::env;
use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Result;
use clap::error::ErrorKind;
use data_cuaca::{Invocation, Options};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let options = match Invocation::from_args(env::args_os()) {
        Ok(Invocation::Usage) => {
            println!("{}", data_cuaca::usage().trim_end());
            return ExitCode::SUCCESS;
        }
        Ok(Invocation::Fetch(options)) => options,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            eprint!("{err}");
            return ExitCode::FAILURE;
        }
    };

    match fetch_and_print(&options).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn fetch_and_print(options: &Options) -> Result<()> {
    let output = data_cuaca::run(options).await?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{output}")?;
    stdout.flush()?;
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install tracing subscriber: {err}");
    }
}
