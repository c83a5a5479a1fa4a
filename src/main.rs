//! histview — polls a ROOT THttpServer and renders its histograms for a
//! web page or dashboard to pick up.
//!
//! Run with:  `RUST_LOG=info histview watch`

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "histview", version, about = "Live histogram viewer for ROOT THttpServer")]
struct Cli {
    /// Configuration file (default: $XDG_CONFIG_HOME/histview/histview.toml).
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Render every panel on each poll until interrupted (default).
    Watch,
    /// Render every panel once.
    Once,
    /// Print the active directory and its histograms.
    List,
    /// Zero the contents of the named histograms.
    Reset {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Zero every histogram of the active directory.
    ResetAll,
}

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG controls verbosity (default: info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let path = cli.config.unwrap_or_else(hv_config::default_path);

    tracing::info!("histview v{} starting", env!("CARGO_PKG_VERSION"));

    match cli.command.unwrap_or(Command::Watch) {
        Command::Watch => hv_app::watch(&path).await?,
        Command::Once => {
            let config = load(&path)?;
            let drawn = hv_app::once(&config).await?;
            println!("{drawn}/{} panel(s) rendered", config.panels.len());
        }
        Command::List => {
            let config = load(&path)?;
            print!("{}", hv_app::list(&config).await?);
        }
        Command::Reset { names } => {
            let config = load(&path)?;
            let done = hv_app::reset(&config, &names).await?;
            if done < names.len() {
                bail!("{} of {} reset(s) failed", names.len() - done, names.len());
            }
        }
        Command::ResetAll => {
            let config = load(&path)?;
            let done = hv_app::reset_all(&config).await?;
            println!("{done} histogram(s) reset");
        }
    }
    Ok(())
}

fn load(path: &std::path::Path) -> Result<hv_config::ViewerConfig> {
    hv_config::load(path).with_context(|| format!("loading {}", path.display()))
}
