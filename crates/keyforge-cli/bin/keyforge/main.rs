mod cli;
mod commands;

use crate::cli::{Command, LogFormatArg, CLI};
use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    let config = CLI::parse();

    init_logging(config.log_format);

    let mut stdout = std::io::stdout().lock();
    match &config.command {
        Command::Generate(args) => commands::generate(args, &mut stdout),
        Command::Decode(args) => commands::decode(args, &mut stdout),
    }
}

/// Logs go to stderr so stdout carries only ids.
fn init_logging(format: LogFormatArg) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormatArg::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormatArg::Text => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}
