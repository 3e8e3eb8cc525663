mod common;

use catalog_backoffice::{
    AlbumEditor, AlbumTracks, ArtistEditor, AudioFile, BackofficeError, DeleteOutcome,
    PlaylistEditor, SubmitOutcome, TrackEditor,
};
use common::{client, logged_in_client, FakeHttp};
use serde_json::json;

fn artist_fixture() -> serde_json::Value {
    json!([
        {"_id": "a1", "name": "Nina Simone", "genre": "Jazz", "popularity": 87},
        {"_id": "a2", "name": "Nick Cave", "genre": "Rock", "popularity": 70}
    ])
}

fn mp3_audio() -> AudioFile {
    let mut data = vec![0xFF, 0xFB, 0x90, 0x64];
    data.extend_from_slice(&[0u8; 128]);
    AudioFile::from_bytes("sinnerman.mp3", data).unwrap()
}

#[test_log::test(tokio::test)]
async fn test_blank_required_fields_send_nothing() {
    let fake = FakeHttp::new();
    let client = logged_in_client(&fake);

    let mut artists = ArtistEditor::new(client.clone());
    artists.draft_mut().name = "Nina Simone".to_string();
    assert!(matches!(
        artists.submit().await,
        Err(BackofficeError::Validation { field: "genre" })
    ));

    let mut albums = AlbumEditor::new(client.clone());
    albums.draft_mut().title = "Pastel Blues".to_string();
    albums.draft_mut().genre = "Jazz".to_string();
    albums.draft_mut().artist_id = "a1".to_string();
    assert!(matches!(
        albums.submit().await,
        Err(BackofficeError::Validation { field: "release_date" })
    ));

    let mut tracks = TrackEditor::new(client.clone());
    tracks.draft_mut().title = "Sinnerman".to_string();
    tracks.draft_mut().artist_id = "a1".to_string();
    tracks.draft_mut().album_id = "al1".to_string();
    assert!(matches!(
        tracks.submit().await,
        Err(BackofficeError::Validation { field: "audio" })
    ));

    let mut playlists = PlaylistEditor::new(client);
    playlists.draft_mut().name = "Late night".to_string();
    assert!(matches!(
        playlists.submit().await,
        Err(BackofficeError::Validation { field: "tracks" })
    ));

    assert!(fake.requests().is_empty());
    // The draft survives a failed submit
    assert_eq!(playlists.draft().name, "Late night");
}

#[test_log::test(tokio::test)]
async fn test_reset_after_edit_creates_without_id() {
    let fake = FakeHttp::new();
    fake.respond("GET", "artists", 200, artist_fixture());
    fake.respond("POST", "artists", 201, json!({"_id": "a3"}));
    let mut editor = ArtistEditor::new(client(&fake));

    editor.refresh().await.unwrap();
    editor.edit_by_id("a1").unwrap();
    assert_eq!(editor.edit_target(), Some("a1"));
    assert_eq!(editor.draft().name, "Nina Simone");

    editor.reset();
    assert_eq!(editor.edit_target(), None);
    editor.draft_mut().name = "Billie Holiday".to_string();
    editor.draft_mut().genre = "Jazz".to_string();

    assert_eq!(editor.submit().await.unwrap(), SubmitOutcome::Created);

    let posts = fake.requests_to("POST", "artists");
    assert_eq!(posts.len(), 1);
    assert!(!posts[0].body.contains("a1"));
    assert_eq!(
        posts[0].json(),
        json!({"name": "Billie Holiday", "genre": "Jazz", "popularity": 0.0})
    );
    assert!(fake.requests_to("PUT", "artists/a1").is_empty());
}

#[test_log::test(tokio::test)]
async fn test_submit_in_edit_mode_updates_and_refreshes() {
    let fake = FakeHttp::new();
    fake.respond("GET", "artists", 200, artist_fixture());
    fake.respond("PUT", "artists/a2", 200, json!({}));
    let mut editor = ArtistEditor::new(client(&fake));

    editor.refresh().await.unwrap();
    editor.edit_by_id("a2").unwrap();
    editor.draft_mut().genre = "Post-punk".to_string();

    let outcome = editor.submit().await.unwrap();
    assert_eq!(
        outcome,
        SubmitOutcome::Updated {
            id: "a2".to_string()
        }
    );

    let puts = fake.requests_to("PUT", "artists/a2");
    assert_eq!(puts.len(), 1);
    assert_eq!(puts[0].json()["genre"], "Post-punk");
    assert_eq!(puts[0].header("Content-Type"), Some("application/json"));

    // Form is back in create mode and the list was reloaded
    assert_eq!(editor.edit_target(), None);
    assert_eq!(editor.draft().name, "");
    assert_eq!(fake.requests_to("GET", "artists").len(), 2);
}

#[test_log::test(tokio::test)]
async fn test_rejected_submit_keeps_draft() {
    let fake = FakeHttp::new();
    fake.respond("POST", "artists", 409, json!({"message": "Artist already exists"}));
    let mut editor = ArtistEditor::new(client(&fake));
    editor.draft_mut().name = "Nina Simone".to_string();
    editor.draft_mut().genre = "Jazz".to_string();

    match editor.submit().await {
        Err(BackofficeError::ServerRejected { status, message }) => {
            assert_eq!(status, 409);
            assert_eq!(message, "Artist already exists");
        }
        other => panic!("Expected rejection, got {other:?}"),
    }
    assert_eq!(editor.draft().name, "Nina Simone");
    // No refresh after a failed save
    assert!(fake.requests_to("GET", "artists").is_empty());
}

#[test_log::test(tokio::test)]
async fn test_delete_requires_confirmation() {
    let fake = FakeHttp::new();
    fake.respond("GET", "artists", 200, artist_fixture());
    fake.respond("DELETE", "artists/a1", 200, json!({}));
    let mut editor = ArtistEditor::new(client(&fake));

    let decline = |_: &str| false;
    assert_eq!(
        editor.delete("a1", &decline).await.unwrap(),
        DeleteOutcome::Declined
    );
    assert!(fake.requests().is_empty());

    let accept = |prompt: &str| {
        assert!(prompt.contains("artist"));
        true
    };
    assert_eq!(
        editor.delete("a1", &accept).await.unwrap(),
        DeleteOutcome::Deleted
    );
    assert_eq!(fake.requests_to("DELETE", "artists/a1").len(), 1);
    assert_eq!(
        fake.requests()
            .iter()
            .filter(|r| r.method == "DELETE")
            .count(),
        1
    );
}

#[test_log::test(tokio::test)]
async fn test_deleting_edit_target_resets_form() {
    let fake = FakeHttp::new();
    fake.respond("GET", "artists", 200, artist_fixture());
    fake.respond("DELETE", "artists/a2", 204, json!(null));
    let mut editor = ArtistEditor::new(client(&fake));

    editor.refresh().await.unwrap();
    editor.edit_by_id("a2").unwrap();
    editor.delete("a2", &|_: &str| true).await.unwrap();

    assert_eq!(editor.edit_target(), None);
    assert_eq!(editor.draft().name, "");
}

#[test_log::test(tokio::test)]
async fn test_failed_refresh_keeps_previous_records() {
    let fake = FakeHttp::new();
    fake.respond("GET", "artists", 200, artist_fixture());
    let mut editor = ArtistEditor::new(client(&fake));
    editor.refresh().await.unwrap();

    fake.respond("GET", "artists", 500, json!({"message": "db down"}));
    assert!(matches!(
        editor.refresh().await,
        Err(BackofficeError::ServerRejected { status: 500, .. })
    ));
    assert_eq!(editor.records().len(), 2);
}

#[test_log::test(tokio::test)]
async fn test_unexpected_shape_is_decode_error() {
    let fake = FakeHttp::new();
    fake.respond("GET", "artists", 200, json!({"artists": []}));
    let mut editor = ArtistEditor::new(client(&fake));

    assert!(matches!(
        editor.refresh().await,
        Err(BackofficeError::Decode(_))
    ));
}

#[test_log::test(tokio::test)]
async fn test_track_submit_without_token_is_auth_error() {
    let fake = FakeHttp::new();
    let mut editor = TrackEditor::new(client(&fake));
    editor.draft_mut().title = "Sinnerman".to_string();
    editor.draft_mut().artist_id = "a1".to_string();
    editor.draft_mut().album_id = "al1".to_string();
    editor.draft_mut().audio = Some(mp3_audio());

    assert!(matches!(
        editor.submit().await,
        Err(BackofficeError::Auth(_))
    ));
    assert!(fake.requests().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_track_upload_is_authenticated_multipart() {
    let fake = FakeHttp::new();
    fake.respond("POST", "audio/upload", 201, json!({"_id": "t9"}));
    fake.respond("GET", "tracks", 200, json!([]));
    let mut editor = TrackEditor::new(logged_in_client(&fake));
    editor.draft_mut().title = "Sinnerman".to_string();
    editor.draft_mut().artist_id = "a1".to_string();
    editor.draft_mut().album_id = "al1".to_string();
    editor.draft_mut().audio = Some(mp3_audio());

    assert_eq!(editor.submit().await.unwrap(), SubmitOutcome::Created);

    let uploads = fake.requests_to("POST", "audio/upload");
    assert_eq!(uploads.len(), 1);
    let upload = &uploads[0];
    assert_eq!(upload.header("Authorization"), Some("Bearer test-token"));
    assert_eq!(upload.header("X-CSRF-Token"), Some("test-csrf"));
    assert!(upload
        .header("Content-Type")
        .unwrap()
        .starts_with("multipart/form-data; boundary="));
    assert!(upload.body.contains("name=\"title\""));
    assert!(upload.body.contains("filename=\"sinnerman.mp3\""));
    assert!(upload.body.contains("Content-Type: audio/mpeg"));
}

#[test_log::test(tokio::test)]
async fn test_playlist_edit_toggles_tracks() {
    let fake = FakeHttp::new();
    fake.respond(
        "GET",
        "playlists",
        200,
        json!([{"_id": "p1", "name": "Late night", "tracks": ["t1", "t2"]}]),
    );
    fake.respond("PUT", "playlists/p1", 200, json!({}));
    let mut editor = PlaylistEditor::new(client(&fake));

    editor.refresh().await.unwrap();
    editor.edit_by_id("p1").unwrap();
    editor.draft_mut().toggle_track("t1");
    editor.draft_mut().toggle_track("t3");
    editor.submit().await.unwrap();

    let puts = fake.requests_to("PUT", "playlists/p1");
    assert_eq!(
        puts[0].json(),
        json!({"name": "Late night", "tracks": ["t2", "t3"]})
    );
}

#[test_log::test(tokio::test)]
async fn test_edit_unknown_id_is_not_found() {
    let fake = FakeHttp::new();
    let mut editor = AlbumEditor::new(client(&fake));
    assert!(matches!(
        editor.edit_by_id("missing"),
        Err(BackofficeError::NotFound(_))
    ));
}

#[test_log::test(tokio::test)]
async fn test_album_track_list_operations() {
    let fake = FakeHttp::new();
    fake.respond(
        "GET",
        "albums/al1/tracks",
        200,
        json!([
            {"_id": "t1", "title": "Be My Husband", "artist": "a1", "album": "al1"},
            {"_id": "t2", "title": "Sinnerman", "artist": "a1", "album": "al1", "duration": 622}
        ]),
    );
    fake.respond("POST", "albums/al1/tracks", 200, json!({}));
    fake.respond("DELETE", "albums/al1/tracks/t1", 200, json!({}));
    fake.respond("PUT", "albums/al1/tracks", 200, json!({}));
    let client = client(&fake);
    let album_tracks = AlbumTracks::new(&client, "al1");

    let tracks = album_tracks.list().await.unwrap();
    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[1].duration_display().as_deref(), Some("10:22"));

    album_tracks.add("t3").await.unwrap();
    assert_eq!(
        fake.requests_to("POST", "albums/al1/tracks")[0].json(),
        json!({"trackId": "t3"})
    );

    album_tracks.remove("t1").await.unwrap();
    assert_eq!(fake.requests_to("DELETE", "albums/al1/tracks/t1").len(), 1);

    album_tracks
        .reorder(&["t2".to_string(), "t1".to_string()])
        .await
        .unwrap();
    assert_eq!(
        fake.requests_to("PUT", "albums/al1/tracks")[0].json(),
        json!({"tracks": ["t2", "t1"]})
    );
}
