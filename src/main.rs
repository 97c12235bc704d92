mod config;
mod logging;
mod model;
mod ports;
mod remote;
mod services;
mod spotify;
mod tidal;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::{Result, eyre::Context};

use crate::{
    config::Config,
    logging::setup_logging,
    services::source::SourceLibrary,
    services::sync::{SyncOptions, run_sync},
    spotify::client::SpotifyClient,
    tidal::client::TidalClient,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, env = "PLAYLIST_MIRROR_CONFIG")]
    config: Option<PathBuf>,

    /// Console log level (default: info)
    #[arg(long, default_value = "info", global = true, env = "LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// File log level (default: debug)
    #[arg(long, default_value = "debug", global = true)]
    log_file_level: log::LevelFilter,

    /// Path to log file
    #[arg(long, env = "PLAYLIST_MIRROR_LOG_FILE", global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Mirror matched Spotify playlists into Tidal
    Sync {
        /// Only mirror playlists whose name starts with this prefix
        #[arg(short, long)]
        prefix: Option<String>,

        /// Tidal folder to file mirrored playlists under
        #[arg(long)]
        parent_folder: Option<String>,

        /// Merge every matched playlist into this single Tidal playlist
        #[arg(long)]
        combine_into: Option<String>,
    },
    /// List matched Spotify playlists and their track counts
    Playlists {
        /// Only list playlists whose name starts with this prefix
        #[arg(short, long)]
        prefix: Option<String>,
    },
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    if let Some(path) = path {
        Config::from_file(&path)
    } else {
        Config::load()
    }
    .with_context(|| "Failed to load playlist-mirror config")
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    setup_logging(args.log_level, args.log_file.clone(), args.log_file_level)?;

    log::debug!("Playlist mirror starting");

    match args.command {
        Commands::Sync {
            prefix,
            parent_folder,
            combine_into,
        } => {
            let config = load_config(args.config)?;
            let library = SourceLibrary::new(SpotifyClient::new(
                config.spotify().access_token.clone(),
                config.spotify().api_base.clone(),
            ));
            let tidal = TidalClient::new(
                config.tidal().access_token.clone(),
                config.tidal().api_base.clone(),
            );

            let options = SyncOptions {
                playlist_prefix: prefix.or_else(|| config.sync().playlist_prefix.clone()),
                parent_folder: parent_folder.or_else(|| config.sync().parent_folder.clone()),
                combine_into: combine_into.or_else(|| config.sync().combine_into.clone()),
            };

            let summaries = run_sync(&library, &tidal, &options).await?;
            for summary in &summaries {
                println!(
                    "{}: {} added, {} skipped, {} not found, {} errors{}",
                    summary.name,
                    summary.added,
                    summary.skipped,
                    summary.not_found,
                    summary.add_error,
                    if summary.reordered { ", reordered" } else { "" }
                );
            }
            log::info!("Sync command completed successfully");
        }
        Commands::Playlists { prefix } => {
            let config = load_config(args.config)?;
            let library = SourceLibrary::new(SpotifyClient::new(
                config.spotify().access_token.clone(),
                config.spotify().api_base.clone(),
            ));

            let prefix = prefix
                .or_else(|| config.sync().playlist_prefix.clone())
                .unwrap_or_default();
            let playlists = library
                .playlists(|name| name.starts_with(prefix.as_str()))
                .await?;

            for playlist in &playlists {
                let cover = if playlist.image.is_some() {
                    ", with cover art"
                } else {
                    ""
                };
                println!(
                    "{} ({} tracks{cover})",
                    playlist.name,
                    playlist.tracks.len()
                );
            }
        }
        Commands::Config(config_commands) => match config_commands {
            ConfigCommands::CreateDefault => {
                Config::create_default()?;
            }
            ConfigCommands::Path => match Config::config_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("No default config path found"),
            },
        },
    }

    Ok(())
}
