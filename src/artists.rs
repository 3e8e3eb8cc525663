use crate::client::Outbound;
use crate::resource::{require, Mode, Resource};
use crate::{BackofficeError, Result};
use http_types::Method;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An artist as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub popularity: f64,
}

impl fmt::Display for Artist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.genre)
    }
}

/// Form state for an artist.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtistDraft {
    pub name: String,
    pub genre: String,
    pub popularity: f64,
}

#[derive(Serialize)]
struct ArtistPayload<'a> {
    name: &'a str,
    genre: &'a str,
    popularity: f64,
}

impl<'a> From<&'a ArtistDraft> for ArtistPayload<'a> {
    fn from(draft: &'a ArtistDraft) -> Self {
        Self {
            name: draft.name.trim(),
            genre: draft.genre.trim(),
            popularity: draft.popularity,
        }
    }
}

/// The `/artists` collection.
pub struct ArtistResource;

impl Resource for ArtistResource {
    type Record = Artist;
    type Draft = ArtistDraft;

    const COLLECTION: &'static str = "artists";
    const NOUN: &'static str = "artist";

    fn record_id(record: &Artist) -> &str {
        &record.id
    }

    fn validate(draft: &ArtistDraft, _mode: Mode) -> Result<()> {
        require(&draft.name, "name")?;
        require(&draft.genre, "genre")?;
        if !draft.popularity.is_finite() {
            return Err(BackofficeError::Validation {
                field: "popularity",
            });
        }
        Ok(())
    }

    fn draft_from_record(record: &Artist) -> ArtistDraft {
        ArtistDraft {
            name: record.name.clone(),
            genre: record.genre.clone(),
            popularity: record.popularity,
        }
    }

    fn create_request(draft: &ArtistDraft) -> Result<Outbound> {
        Outbound::json(Method::Post, Self::COLLECTION, &ArtistPayload::from(draft))
    }

    fn update_request(id: &str, draft: &ArtistDraft) -> Result<Outbound> {
        Outbound::json(
            Method::Put,
            format!("{}/{}", Self::COLLECTION, urlencoding::encode(id)),
            &ArtistPayload::from(draft),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Payload;

    #[test]
    fn test_artist_decoding_defaults() {
        let artist: Artist = serde_json::from_str(r#"{"_id":"a1","name":"Nina Simone"}"#).unwrap();
        assert_eq!(artist.genre, "");
        assert_eq!(artist.popularity, 0.0);
    }

    #[test]
    fn test_validation_order() {
        let mut draft = ArtistDraft::default();
        assert!(matches!(
            ArtistResource::validate(&draft, Mode::Create),
            Err(BackofficeError::Validation { field: "name" })
        ));

        draft.name = "Nina Simone".to_string();
        assert!(matches!(
            ArtistResource::validate(&draft, Mode::Create),
            Err(BackofficeError::Validation { field: "genre" })
        ));

        draft.genre = "Jazz".to_string();
        assert!(ArtistResource::validate(&draft, Mode::Create).is_ok());
    }

    #[test]
    fn test_non_finite_popularity_rejected() {
        let mut draft = ArtistDraft {
            name: "Nina Simone".to_string(),
            genre: "Jazz".to_string(),
            popularity: f64::NAN,
        };
        assert!(matches!(
            ArtistResource::validate(&draft, Mode::Create),
            Err(BackofficeError::Validation {
                field: "popularity"
            })
        ));

        draft.popularity = f64::INFINITY;
        assert!(matches!(
            ArtistResource::validate(&draft, Mode::Update),
            Err(BackofficeError::Validation {
                field: "popularity"
            })
        ));
    }

    #[test]
    fn test_update_request_shape() {
        let draft = ArtistDraft {
            name: " Nina Simone ".to_string(),
            genre: "Jazz".to_string(),
            popularity: 87.0,
        };
        let outbound = ArtistResource::update_request("a1", &draft).unwrap();

        assert_eq!(outbound.method, Method::Put);
        assert_eq!(outbound.path, "artists/a1");
        assert!(!outbound.requires_auth);
        assert_eq!(
            outbound.payload,
            Payload::Json(serde_json::json!({
                "name": "Nina Simone",
                "genre": "Jazz",
                "popularity": 87.0
            }))
        );
    }
}
