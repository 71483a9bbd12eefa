use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use notelet::cli::{Cli, Commands};
use notelet::commands;
use notelet_core::storage::{read_config, Config, Notebook, Session};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let config_path = match cli.config.clone() {
        Some(path) => path,
        None => default_config_path()?,
    };
    let config = read_config(&config_path)
        .await
        .with_context(|| format!("Failed to read config at {}", config_path.display()))?;

    // use-folder only needs the config; everything else needs a session.
    if let Commands::UseFolder { path } = &cli.command {
        return commands::handle_use_folder(&config_path, config, path.clone()).await;
    }

    let session = open_session(&cli, &config).await?;
    match cli.command {
        Commands::List => commands::handle_list(&session).await?,
        Commands::Show { note } => commands::handle_show(&session, &note).await?,
        Commands::New { content } => commands::handle_new(&session, content).await?,
        Commands::Rename { note, name } => commands::handle_rename(&session, &note, &name).await?,
        Commands::Delete { note } => commands::handle_delete(&session, &note).await?,
        Commands::UseFolder { .. } => unreachable!("handled above"),
    }

    Ok(())
}

async fn open_session(cli: &Cli, config: &Config) -> Result<Session> {
    let root = cli
        .root
        .clone()
        .or_else(|| config.root_dir.clone())
        .context("No notes folder configured. Run `notelet use-folder <path>` or pass --root.")?;

    let notebook = Notebook::open(&root)
        .await
        .with_context(|| format!("Failed to open notes folder {}", root.display()))?;
    Session::start(notebook).await.context("Failed to start session")
}

fn default_config_path() -> Result<PathBuf> {
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .context("Cannot locate the home directory; pass --config explicitly")?;
    Ok(PathBuf::from(home).join(".config").join("notelet").join("config.json"))
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
