use crate::client::{BackofficeClient, Outbound};
use crate::resource::{require, Mode, Resource};
use crate::types::{normalize_date, Reference};
use crate::Result;
use http_types::Method;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Image URLs attached to an album.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumImages {
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// An album as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub release_date: Option<String>,
    pub artist: Reference,
    #[serde(default)]
    pub images: AlbumImages,
    #[serde(default)]
    pub tracks: Vec<Reference>,
}

impl Album {
    /// Release date as `YYYY-MM-DD`
    pub fn release_day(&self) -> Option<String> {
        self.release_date.as_deref().map(normalize_date)
    }
}

impl fmt::Display for Album {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.artist, self.title)
    }
}

/// Form state for an album.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlbumDraft {
    pub title: String,
    pub genre: String,
    /// `YYYY-MM-DD`
    pub release_date: String,
    pub artist_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AlbumPayload<'a> {
    title: &'a str,
    genre: &'a str,
    release_date: &'a str,
    artist: &'a str,
}

impl<'a> From<&'a AlbumDraft> for AlbumPayload<'a> {
    fn from(draft: &'a AlbumDraft) -> Self {
        Self {
            title: draft.title.trim(),
            genre: draft.genre.trim(),
            release_date: draft.release_date.trim(),
            artist: draft.artist_id.trim(),
        }
    }
}

/// The `/albums` collection.
pub struct AlbumResource;

impl Resource for AlbumResource {
    type Record = Album;
    type Draft = AlbumDraft;

    const COLLECTION: &'static str = "albums";
    const NOUN: &'static str = "album";

    fn record_id(record: &Album) -> &str {
        &record.id
    }

    fn validate(draft: &AlbumDraft, _mode: Mode) -> Result<()> {
        require(&draft.title, "title")?;
        require(&draft.genre, "genre")?;
        require(&draft.release_date, "release_date")?;
        require(&draft.artist_id, "artist")
    }

    fn draft_from_record(record: &Album) -> AlbumDraft {
        AlbumDraft {
            title: record.title.clone(),
            genre: record.genre.clone(),
            release_date: record.release_day().unwrap_or_default(),
            artist_id: record.artist.id().to_string(),
        }
    }

    fn create_request(draft: &AlbumDraft) -> Result<Outbound> {
        Outbound::json(Method::Post, Self::COLLECTION, &AlbumPayload::from(draft))
    }

    fn update_request(id: &str, draft: &AlbumDraft) -> Result<Outbound> {
        Outbound::json(Method::Put, album_path(id), &AlbumPayload::from(draft))
    }
}

fn album_path(id: &str) -> String {
    format!("{}/{}", AlbumResource::COLLECTION, urlencoding::encode(id))
}

fn album_tracks_path(album_id: &str) -> String {
    format!("{}/tracks", album_path(album_id))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddTrackPayload<'a> {
    track_id: &'a str,
}

#[derive(Serialize)]
struct ReorderPayload<'a> {
    tracks: &'a [String],
}

/// Ordered track list of one album (`/albums/:id/tracks`).
pub struct AlbumTracks<'a> {
    client: &'a BackofficeClient,
    album_id: String,
}

impl<'a> AlbumTracks<'a> {
    pub fn new(client: &'a BackofficeClient, album_id: &str) -> Self {
        Self {
            client,
            album_id: album_id.to_string(),
        }
    }

    pub fn album_id(&self) -> &str {
        &self.album_id
    }

    /// Tracks of the album in playing order.
    pub async fn list(&self) -> Result<Vec<crate::tracks::Track>> {
        self.client.get_json(&album_tracks_path(&self.album_id)).await
    }

    /// Append a track to the album.
    pub async fn add(&self, track_id: &str) -> Result<()> {
        require(track_id, "track")?;
        let outbound = Outbound::json(
            Method::Post,
            album_tracks_path(&self.album_id),
            &AddTrackPayload { track_id },
        )?;
        self.client.execute(outbound).await?;
        Ok(())
    }

    /// Detach a track from the album.
    pub async fn remove(&self, track_id: &str) -> Result<()> {
        let path = format!(
            "{}/{}",
            album_tracks_path(&self.album_id),
            urlencoding::encode(track_id)
        );
        self.client.execute(Outbound::delete(path)).await?;
        Ok(())
    }

    /// Persist a new playing order.
    pub async fn reorder(&self, track_ids: &[String]) -> Result<()> {
        let outbound = Outbound::json(
            Method::Put,
            album_tracks_path(&self.album_id),
            &ReorderPayload { tracks: track_ids },
        )?;
        self.client.execute(outbound).await?;
        log::info!(
            "Reordered {} tracks of album {}",
            track_ids.len(),
            self.album_id
        );
        Ok(())
    }
}

/// Move the element at `from` to position `to`, shifting the ones in between.
///
/// This is the drop step of a drag-and-drop reorder. Returns `false` and leaves
/// `items` untouched when either index is out of range.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= items.len() || to >= items.len() {
        return false;
    }
    if from != to {
        let item = items.remove(from);
        items.insert(to, item);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Payload;
    use crate::BackofficeError;

    const POPULATED: &str = r#"{
        "_id": "al1",
        "title": "Pastel Blues",
        "genre": "Jazz",
        "releaseDate": "1965-10-01T00:00:00.000Z",
        "artist": {"_id": "ar1", "name": "Nina Simone"},
        "images": {"thumbnail": "http://cdn/pastel.jpg"},
        "tracks": ["t1", {"_id": "t2", "title": "Sinnerman"}]
    }"#;

    #[test]
    fn test_album_decoding() {
        let album: Album = serde_json::from_str(POPULATED).unwrap();
        assert_eq!(album.artist.id(), "ar1");
        assert_eq!(album.to_string(), "Nina Simone - Pastel Blues");
        assert_eq!(album.images.thumbnail.as_deref(), Some("http://cdn/pastel.jpg"));
        assert_eq!(album.tracks.len(), 2);
        assert_eq!(album.release_day().as_deref(), Some("1965-10-01"));
    }

    #[test]
    fn test_album_decoding_with_bare_artist() {
        let album: Album =
            serde_json::from_str(r#"{"_id":"al2","title":"Untitled","artist":"ar9"}"#).unwrap();
        assert_eq!(album.artist, Reference::Id("ar9".to_string()));
        assert!(album.tracks.is_empty());
        assert!(album.release_day().is_none());
    }

    #[test]
    fn test_edit_normalizes_release_date() {
        let album: Album = serde_json::from_str(POPULATED).unwrap();
        let draft = AlbumResource::draft_from_record(&album);
        assert_eq!(
            draft,
            AlbumDraft {
                title: "Pastel Blues".to_string(),
                genre: "Jazz".to_string(),
                release_date: "1965-10-01".to_string(),
                artist_id: "ar1".to_string(),
            }
        );
    }

    #[test]
    fn test_blank_artist_selection_rejected() {
        let draft = AlbumDraft {
            title: "Pastel Blues".to_string(),
            genre: "Jazz".to_string(),
            release_date: "1965-10-01".to_string(),
            artist_id: String::new(),
        };
        assert!(matches!(
            AlbumResource::validate(&draft, Mode::Create),
            Err(BackofficeError::Validation { field: "artist" })
        ));
    }

    #[test]
    fn test_create_payload_uses_wire_names() {
        let draft = AlbumDraft {
            title: "Pastel Blues".to_string(),
            genre: "Jazz".to_string(),
            release_date: "1965-10-01".to_string(),
            artist_id: "ar1".to_string(),
        };
        let outbound = AlbumResource::create_request(&draft).unwrap();
        assert_eq!(outbound.method, Method::Post);
        assert_eq!(outbound.path, "albums");
        assert_eq!(
            outbound.payload,
            Payload::Json(serde_json::json!({
                "title": "Pastel Blues",
                "genre": "Jazz",
                "releaseDate": "1965-10-01",
                "artist": "ar1"
            }))
        );
    }

    #[test]
    fn test_move_item() {
        let mut ids = vec!["a", "b", "c", "d"];
        assert!(move_item(&mut ids, 0, 2));
        assert_eq!(ids, vec!["b", "c", "a", "d"]);

        assert!(move_item(&mut ids, 3, 0));
        assert_eq!(ids, vec!["d", "b", "c", "a"]);

        assert!(!move_item(&mut ids, 4, 0));
        assert!(!move_item(&mut ids, 0, 9));
        assert_eq!(ids, vec!["d", "b", "c", "a"]);
    }
}
