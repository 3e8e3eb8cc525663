use crate::client::Outbound;
use crate::multipart::MultipartForm;
use crate::resource::{require, Mode, Resource};
use crate::types::Reference;
use crate::{BackofficeError, Result};
use http_types::Method;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// A track as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    /// Length in seconds
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub genre: Option<String>,
    pub artist: Reference,
    pub album: Reference,
    #[serde(default)]
    pub audio_url: Option<String>,
}

impl Track {
    /// Duration as `m:ss`
    pub fn duration_display(&self) -> Option<String> {
        self.duration
            .filter(|d| d.is_finite() && *d >= 0.0)
            .map(|d| {
                let secs = d.round() as u64;
                format!("{}:{:02}", secs / 60, secs % 60)
            })
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} [{}]", self.artist, self.title, self.album)
    }
}

/// An audio file picked for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFile {
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl AudioFile {
    /// Wrap in-memory audio, sniffing its MIME type from the content.
    ///
    /// Content recognised as something other than audio is rejected.
    pub fn from_bytes(file_name: &str, data: Vec<u8>) -> Result<Self> {
        let mime_type = match infer::get(&data) {
            Some(kind) if kind.matcher_type() == infer::MatcherType::Audio => {
                kind.mime_type().to_string()
            }
            Some(kind) => {
                log::warn!("Rejecting {file_name}: detected {}", kind.mime_type());
                return Err(BackofficeError::Validation { field: "audio" });
            }
            None => "application/octet-stream".to_string(),
        };

        Ok(Self {
            file_name: file_name.to_string(),
            mime_type,
            data,
        })
    }

    /// Read an audio file from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio")
            .to_string();
        Self::from_bytes(&file_name, data)
    }
}

/// Form state for a track.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackDraft {
    pub title: String,
    pub artist_id: String,
    pub album_id: String,
    pub genre: String,
    /// Required when creating; when updating, only sent if a new file was picked
    pub audio: Option<AudioFile>,
}

/// Tracks, uploaded through the authenticated `/audio` endpoints.
pub struct TrackResource;

impl TrackResource {
    fn form(draft: &TrackDraft) -> MultipartForm {
        let mut form = MultipartForm::new()
            .text("title", draft.title.trim())
            .text("artistId", draft.artist_id.trim())
            .text("albumId", draft.album_id.trim());
        if !draft.genre.trim().is_empty() {
            form = form.text("genre", draft.genre.trim());
        }
        if let Some(audio) = &draft.audio {
            form = form.file(
                "audio",
                &audio.file_name,
                &audio.mime_type,
                audio.data.clone(),
            );
        }
        form
    }
}

impl Resource for TrackResource {
    type Record = Track;
    type Draft = TrackDraft;

    const COLLECTION: &'static str = "tracks";
    const NOUN: &'static str = "track";

    fn record_id(record: &Track) -> &str {
        &record.id
    }

    fn validate(draft: &TrackDraft, mode: Mode) -> Result<()> {
        require(&draft.title, "title")?;
        require(&draft.artist_id, "artist")?;
        require(&draft.album_id, "album")?;
        if mode == Mode::Create && draft.audio.is_none() {
            return Err(BackofficeError::Validation { field: "audio" });
        }
        Ok(())
    }

    fn draft_from_record(record: &Track) -> TrackDraft {
        TrackDraft {
            title: record.title.clone(),
            artist_id: record.artist.id().to_string(),
            album_id: record.album.id().to_string(),
            genre: record.genre.clone().unwrap_or_default(),
            audio: None,
        }
    }

    fn create_request(draft: &TrackDraft) -> Result<Outbound> {
        Ok(Outbound::multipart(Method::Post, "audio/upload", Self::form(draft)).authenticated())
    }

    fn update_request(id: &str, draft: &TrackDraft) -> Result<Outbound> {
        let path = format!("audio/{}", urlencoding::encode(id));
        Ok(Outbound::multipart(Method::Patch, path, Self::form(draft)).authenticated())
    }
}
