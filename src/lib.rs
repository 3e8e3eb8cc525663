//! # catalog-backoffice
//!
//! Administrative client for a music catalog REST backend.
//!
//! - [`ResourceEditor`] lists, creates, edits and deletes artists, albums,
//!   tracks and playlists, validating drafts before anything is sent.
//! - [`dashboard::Dashboard`] polls server and Redis metrics and raises alerts
//!   when a KPI crosses its threshold.
//! - [`search::SuggestionBox`] keeps autocomplete suggestions in sync with the
//!   latest query.
//!
//! All network access goes through a [`BackofficeClient`], which wraps any
//! [`http_client::HttpClient`] implementation.

pub mod albums;
pub mod artists;
pub mod cancel;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod headers;
pub mod multipart;
pub mod playlists;
pub mod resource;
pub mod search;
pub mod session;
pub mod store;
pub mod tracks;
pub mod types;

pub use albums::{Album, AlbumDraft, AlbumResource, AlbumTracks};
pub use artists::{Artist, ArtistDraft, ArtistResource};
pub use cancel::CancellationState;
pub use client::{ApiResponse, BackofficeClient, Outbound, Payload};
pub use config::ClientConfig;
pub use dashboard::{Alert, Dashboard, KpiPreference, MetricsSource, Notifier, PollOutcome};
#[cfg(feature = "mock")]
pub use dashboard::{MockMetricsSource, MockNotifier};
pub use error::BackofficeError;
pub use events::{ClientEvent, ClientEventReceiver, RequestInfo};
pub use playlists::{Playlist, PlaylistDraft, PlaylistResource};
pub use resource::{Confirm, DeleteOutcome, Mode, Resource, ResourceEditor, SubmitOutcome};
pub use search::{SearchResults, SuggestionBox, SuggestionSource};
#[cfg(feature = "mock")]
pub use search::MockSuggestionSource;
pub use session::BackofficeSession;
pub use store::AppStateStore;
pub use tracks::{AudioFile, Track, TrackDraft, TrackResource};
pub use types::Reference;

pub type ArtistEditor = ResourceEditor<ArtistResource>;
pub type AlbumEditor = ResourceEditor<AlbumResource>;
pub type TrackEditor = ResourceEditor<TrackResource>;
pub type PlaylistEditor = ResourceEditor<PlaylistResource>;

pub type Result<T> = std::result::Result<T, BackofficeError>;
