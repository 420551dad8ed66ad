mod cli;
mod commands;
mod error;

use crate::cli::{Args, Commands};
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use mangadav_config::Config;
use mangadav_namespace::{Context, Layout, Resolver};
use mangadav_remote::Library;
use mangadav_remote::transport::HttpTransport;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Debug renders the whole error tree, with locations.
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        },
    }
}

async fn run(args: Args) -> Result<()> {
    let config = Config::load(args.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    let resolver = build_resolver(&config)?;
    let mut stdout = tokio::io::stdout();
    match args.command {
        Commands::Ls { path } => commands::ls(&resolver, &path, &mut stdout).await,
        Commands::Cat { path, output: None } => commands::cat(&resolver, &path, &mut stdout).await,
        Commands::Cat { path, output: Some(output) } => {
            let mut file = tokio::fs::File::create(&output).await.or_raise(|| ErrorKind::Io)?;
            commands::cat(&resolver, &path, &mut file).await?;
            file.sync_all().await.or_raise(|| ErrorKind::Io)
        },
        Commands::Stat { path } => commands::stat(&resolver, &path, &mut stdout).await,
        Commands::Tree { path, depth } => commands::tree(&resolver, &path, depth, &mut stdout).await,
    }?;
    stdout.flush().await.or_raise(|| ErrorKind::Io)
}

fn build_resolver(config: &Config) -> Result<Resolver> {
    let transport = HttpTransport::builder(&config.remote.api_url, &config.remote.content_url)
        .and_then(|builder| builder.timeout(config.remote.timeout()).user_agent(&config.remote.user_agent).build())
        .or_raise(|| ErrorKind::Remote)?;
    let transport = Arc::new(transport);
    let library = Library::new(transport.clone()).with_page_size(config.remote.page_size);
    let layout = Layout {
        extension: config.namespace.page_extension.clone(),
        content_type: config.namespace.content_type.clone(),
    };
    tracing::debug!(api_url = %config.remote.api_url, "Catalog client ready");
    Ok(Resolver::new(Context::new(library, transport).with_layout(layout)))
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).init();
}
