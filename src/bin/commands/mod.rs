pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod search;
pub mod utils;

use catalog_backoffice::{AppStateStore, BackofficeClient};
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum ArtistCommands {
    /// List all artists
    List {
        /// Print records as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Create an artist
    ///
    /// Usage examples:
    /// # Create an artist
    /// backoffice artists create --name "Nina Simone" --genre Jazz --popularity 87
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        genre: String,

        #[arg(long, default_value = "0")]
        popularity: f64,
    },

    /// Update an artist; only the given fields change
    Update {
        /// Artist id
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        genre: Option<String>,

        #[arg(long)]
        popularity: Option<f64>,
    },

    /// Delete an artist after confirmation
    Delete {
        /// Artist id
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum AlbumCommands {
    /// List all albums
    List {
        /// Print records as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Create an album
    ///
    /// Usage examples:
    /// # Create an album for an existing artist
    /// backoffice albums create --title "Pastel Blues" --genre Jazz --release-date 1965-10-01 --artist 65a1
    Create {
        #[arg(long)]
        title: String,

        #[arg(long)]
        genre: String,

        /// Release date as YYYY-MM-DD
        #[arg(long)]
        release_date: String,

        /// Artist id
        #[arg(long)]
        artist: String,
    },

    /// Update an album; only the given fields change
    Update {
        /// Album id
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        genre: Option<String>,

        #[arg(long)]
        release_date: Option<String>,

        #[arg(long)]
        artist: Option<String>,
    },

    /// Delete an album after confirmation
    Delete {
        /// Album id
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Show the tracks of an album in playing order
    Tracks {
        /// Album id
        id: String,
    },

    /// Append a track to an album
    AddTrack {
        /// Album id
        album: String,

        /// Track id
        track: String,
    },

    /// Remove a track from an album
    RemoveTrack {
        /// Album id
        album: String,

        /// Track id
        track: String,
    },

    /// Move a track to another position (1-based) and save the new order
    ///
    /// Usage examples:
    /// # Make the third track the opener
    /// backoffice albums move-track 65a1 --from 3 --to 1
    MoveTrack {
        /// Album id
        album: String,

        #[arg(long)]
        from: usize,

        #[arg(long)]
        to: usize,
    },
}

#[derive(Subcommand)]
pub enum TrackCommands {
    /// List all tracks
    List {
        /// Print records as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Upload a new track (requires login)
    ///
    /// Usage examples:
    /// # Upload an mp3 for an existing album
    /// backoffice tracks create --title Sinnerman --artist 65a1 --album 65b2 --audio ./sinnerman.mp3
    Create {
        #[arg(long)]
        title: String,

        /// Artist id
        #[arg(long)]
        artist: String,

        /// Album id
        #[arg(long)]
        album: String,

        #[arg(long)]
        genre: Option<String>,

        /// Audio file to upload
        #[arg(long)]
        audio: PathBuf,
    },

    /// Update a track (requires login); only the given fields change
    Update {
        /// Track id
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        artist: Option<String>,

        #[arg(long)]
        album: Option<String>,

        #[arg(long)]
        genre: Option<String>,

        /// Replacement audio file
        #[arg(long)]
        audio: Option<PathBuf>,
    },

    /// Delete a track after confirmation
    Delete {
        /// Track id
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum PlaylistCommands {
    /// List all playlists
    List {
        /// Print records as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Create a playlist from one or more tracks
    ///
    /// Usage examples:
    /// # Create a playlist with two tracks
    /// backoffice playlists create --name "Late night" --track 65c1 --track 65c2
    Create {
        #[arg(long)]
        name: String,

        /// Track id (repeatable)
        #[arg(long = "track", required = true)]
        tracks: Vec<String>,
    },

    /// Rename a playlist or toggle tracks in and out of it
    Update {
        /// Playlist id
        id: String,

        #[arg(long)]
        name: Option<String>,

        /// Track id to add if absent or remove if present (repeatable)
        #[arg(long = "toggle")]
        toggle: Vec<String>,
    },

    /// Delete a playlist after confirmation
    Delete {
        /// Playlist id
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum DashboardCommands {
    /// Poll the metrics once and print charts and alerts
    Show {
        /// Print the snapshot and alerts as JSON
        #[arg(long)]
        json: bool,
    },

    /// Keep polling and print alerts as they are raised (Ctrl-C to stop)
    Watch {
        /// Seconds between polls (defaults to the configured interval)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Print the KPI preferences
    Preferences,

    /// Change the alert threshold of a KPI
    ///
    /// Usage examples:
    /// # Alert when any core goes above 75%
    /// backoffice dashboard set-threshold cpu 75
    SetThreshold {
        /// KPI id (cpu, memory, redis)
        kpi: String,

        value: f64,
    },
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in with BACKOFFICE_EMAIL / BACKOFFICE_PASSWORD and save the session
    Login,

    /// Forget the saved session
    Logout,

    /// Manage artists
    Artists {
        #[command(subcommand)]
        command: ArtistCommands,
    },

    /// Manage albums and their track order
    Albums {
        #[command(subcommand)]
        command: AlbumCommands,
    },

    /// Manage tracks and audio uploads
    Tracks {
        #[command(subcommand)]
        command: TrackCommands,
    },

    /// Manage playlists
    Playlists {
        #[command(subcommand)]
        command: PlaylistCommands,
    },

    /// System and Redis metrics with threshold alerts
    Dashboard {
        #[command(subcommand)]
        command: DashboardCommands,
    },

    /// Search the whole catalog
    Search {
        query: String,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show autocomplete suggestions for a partial query
    ///
    /// Usage examples:
    /// # Suggestions for "nin"
    /// backoffice suggest nin
    ///
    /// # Fire one request per typed prefix, keeping only the latest answer
    /// backoffice suggest "nina sim" --as-typed
    Suggest {
        query: String,

        /// Query every prefix concurrently as if typed
        #[arg(long)]
        as_typed: bool,
    },
}

pub async fn execute_command(
    command: Commands,
    client: &BackofficeClient,
    store: &AppStateStore,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Login => auth::handle_login(client, store).await,
        Commands::Logout => auth::handle_logout(client, store),
        Commands::Artists { command } => catalog::handle_artists(client, command).await,
        Commands::Albums { command } => catalog::handle_albums(client, command).await,
        Commands::Tracks { command } => catalog::handle_tracks(client, store, command).await,
        Commands::Playlists { command } => catalog::handle_playlists(client, command).await,
        Commands::Dashboard { command } => match command {
            DashboardCommands::Show { json } => {
                dashboard::handle_show(client, store.clone(), json).await
            }
            DashboardCommands::Watch { interval } => {
                dashboard::handle_watch(client, store.clone(), interval).await
            }
            DashboardCommands::Preferences => dashboard::handle_preferences(store),
            DashboardCommands::SetThreshold { kpi, value } => {
                dashboard::handle_set_threshold(client, store.clone(), &kpi, value)
            }
        },
        Commands::Search { query, json } => search::handle_search(client, &query, json).await,
        Commands::Suggest { query, as_typed } => {
            search::handle_suggest(client, &query, as_typed).await
        }
    }
}
