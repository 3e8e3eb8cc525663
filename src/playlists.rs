use crate::client::Outbound;
use crate::resource::{require, Mode, Resource};
use crate::types::Reference;
use crate::{BackofficeError, Result};
use http_types::Method;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A playlist as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tracks: Vec<Reference>,
}

impl fmt::Display for Playlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} tracks)", self.name, self.tracks.len())
    }
}

/// Form state for a playlist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistDraft {
    pub name: String,
    /// Selected tracks in insertion order
    pub track_ids: Vec<String>,
}

impl PlaylistDraft {
    /// Select `track_id` if it is not selected, deselect it otherwise.
    ///
    /// Returns whether the track is selected afterwards.
    pub fn toggle_track(&mut self, track_id: &str) -> bool {
        if let Some(pos) = self.track_ids.iter().position(|id| id == track_id) {
            self.track_ids.remove(pos);
            false
        } else {
            self.track_ids.push(track_id.to_string());
            true
        }
    }

    pub fn is_selected(&self, track_id: &str) -> bool {
        self.track_ids.iter().any(|id| id == track_id)
    }
}

#[derive(Serialize)]
struct PlaylistPayload<'a> {
    name: &'a str,
    tracks: &'a [String],
}

impl<'a> From<&'a PlaylistDraft> for PlaylistPayload<'a> {
    fn from(draft: &'a PlaylistDraft) -> Self {
        Self {
            name: draft.name.trim(),
            tracks: &draft.track_ids,
        }
    }
}

/// The `/playlists` collection.
pub struct PlaylistResource;

impl Resource for PlaylistResource {
    type Record = Playlist;
    type Draft = PlaylistDraft;

    const COLLECTION: &'static str = "playlists";
    const NOUN: &'static str = "playlist";

    fn record_id(record: &Playlist) -> &str {
        &record.id
    }

    fn validate(draft: &PlaylistDraft, _mode: Mode) -> Result<()> {
        require(&draft.name, "name")?;
        if draft.track_ids.iter().all(|id| id.trim().is_empty()) {
            return Err(BackofficeError::Validation { field: "tracks" });
        }
        Ok(())
    }

    fn draft_from_record(record: &Playlist) -> PlaylistDraft {
        PlaylistDraft {
            name: record.name.clone(),
            track_ids: record.tracks.iter().map(|t| t.id().to_string()).collect(),
        }
    }

    fn create_request(draft: &PlaylistDraft) -> Result<Outbound> {
        Outbound::json(Method::Post, Self::COLLECTION, &PlaylistPayload::from(draft))
    }

    fn update_request(id: &str, draft: &PlaylistDraft) -> Result<Outbound> {
        Outbound::json(
            Method::Put,
            format!("{}/{}", Self::COLLECTION, urlencoding::encode(id)),
            &PlaylistPayload::from(draft),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_track() {
        let mut draft = PlaylistDraft::default();
        assert!(draft.toggle_track("t1"));
        assert!(draft.toggle_track("t2"));
        assert!(draft.is_selected("t1"));

        assert!(!draft.toggle_track("t1"));
        assert_eq!(draft.track_ids, vec!["t2".to_string()]);
    }

    #[test]
    fn test_empty_selection_rejected() {
        let draft = PlaylistDraft {
            name: "Late night".to_string(),
            track_ids: Vec::new(),
        };
        assert!(matches!(
            PlaylistResource::validate(&draft, Mode::Create),
            Err(BackofficeError::Validation { field: "tracks" })
        ));
    }

    #[test]
    fn test_edit_copies_track_ids_in_order() {
        let playlist: Playlist = serde_json::from_str(
            r#"{"_id":"p1","name":"Late night","tracks":[{"_id":"t2","title":"B"},"t1","t2"]}"#,
        )
        .unwrap();
        let draft = PlaylistResource::draft_from_record(&playlist);
        assert_eq!(draft.name, "Late night");
        assert_eq!(draft.track_ids, vec!["t2", "t1", "t2"]);
        assert_eq!(playlist.to_string(), "Late night (3 tracks)");
    }
}
