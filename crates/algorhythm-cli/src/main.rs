use anyhow::{Context as _, Result};
use clap::Parser;
use std::path::PathBuf;

use algorhythm_fetch::Config;

mod commands;

use commands::Context;

#[derive(Debug, Parser)]
#[command(name = "algorhythm", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the JSON catalog (default: ~/.local/share/algorhythm/catalog.json)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Path to a tuning file overriding the built-in tables
    #[arg(long, global = true)]
    tuning: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Build the DNA of a playlist and report its cohesion
    ///
    /// Loads the playlist's tracks from the catalog, fetches their audio
    /// features, fits the statistical descriptor and prints:
    ///
    /// - The numbered track list (positions are what --exclude takes)
    /// - The per-feature profile and the cohesion score
    /// - Conviction per feature, PCA breakdown, correlated pairs
    /// - Dominant traits and the key/mode distributions
    ///
    /// Use --out to save the descriptor for later `score --dna` runs.
    Dna {
        /// Playlist id or share URL
        playlist: String,

        /// 1-indexed track positions to leave out before fitting
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<usize>,

        /// Write the fitted descriptor to this JSON file
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Score a track against a playlist's DNA
    Score {
        /// Track id or share URL
        track: String,

        /// Score against a descriptor saved with `dna --out`
        #[arg(long, conflicts_with = "playlist", required_unless_present = "playlist")]
        dna: Option<PathBuf>,

        /// Build the DNA of this playlist first
        #[arg(long)]
        playlist: Option<String>,

        /// Positions to leave out when building from --playlist
        #[arg(long, value_delimiter = ',', requires = "playlist")]
        exclude: Vec<usize>,
    },
    /// Map the artists comparable to an artist
    Neighborhood {
        /// Artist id or share URL
        artist: String,

        /// Maximum number of neighbors
        #[arg(long, default_value_t = 20)]
        max: usize,

        /// Print the neighborhood as a Graphviz DOT graph
        #[arg(long)]
        dot: bool,
    },
    /// Find the neighborhood artists that sound most like a track
    Twins {
        /// Target track id or share URL
        track: String,

        /// The track's artist (id or share URL)
        artist: String,

        /// Number of twins to report (default from tuning)
        #[arg(long)]
        top: Option<usize>,
    },
    /// List the playlists an artist is discovered on
    DiscoveredOn {
        /// Artist id or share URL
        artist: String,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigAction {
    /// Show the current effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file if it doesn't exist
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config commands must work even when the config file is broken.
    if let Commands::Config { action } = &cli.command {
        return match action {
            ConfigAction::Show => commands::config::show_config(),
            ConfigAction::Path => commands::config::show_path(),
            ConfigAction::Example => commands::config::show_example(),
            ConfigAction::Init => commands::config::init_config(),
        };
    }

    let config = Config::load()?;
    twyg::setup(config.logging.clone())
        .map_err(|e| anyhow::anyhow!("Failed to set up logging: {e:?}"))?;

    let ctx = Context::open(config, cli.catalog, cli.tuning, cli.json)
        .context("Failed to open catalog")?;

    match cli.command {
        Commands::Dna {
            playlist,
            exclude,
            out,
        } => {
            commands::dna::run_dna(&ctx, &playlist, &exclude, out.as_deref()).await?;
        }
        Commands::Score {
            track,
            dna,
            playlist,
            exclude,
        } => {
            commands::score::run_score(&ctx, &track, dna.as_deref(), playlist.as_deref(), &exclude)
                .await?;
        }
        Commands::Neighborhood { artist, max, dot } => {
            commands::neighborhood::run_neighborhood(&ctx, &artist, max, dot).await?;
        }
        Commands::Twins { track, artist, top } => {
            commands::twins::run_twins(&ctx, &track, &artist, top).await?;
        }
        Commands::DiscoveredOn { artist } => {
            commands::discovered::run_discovered_on(&ctx, &artist).await?;
        }
        Commands::Config { .. } => {}
    }

    Ok(())
}
