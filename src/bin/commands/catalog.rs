use super::utils::{ask_for_confirmation, ensure_logged_in, output_json};
use super::{AlbumCommands, ArtistCommands, PlaylistCommands, TrackCommands};
use catalog_backoffice::albums::move_item;
use catalog_backoffice::{
    AlbumDraft, AlbumResource, AlbumTracks, AppStateStore, ArtistDraft, ArtistResource,
    AudioFile, BackofficeClient, BackofficeError, DeleteOutcome, PlaylistDraft, PlaylistResource,
    Resource, ResourceEditor, SubmitOutcome, TrackDraft, TrackResource,
};
use serde::Serialize;
use std::fmt::Display;

type CommandResult = Result<(), Box<dyn std::error::Error>>;

async fn load_editor<R: Resource>(
    client: &BackofficeClient,
) -> Result<ResourceEditor<R>, BackofficeError> {
    let mut editor = ResourceEditor::<R>::new(client.clone());
    editor.refresh().await?;
    Ok(editor)
}

async fn handle_list<R>(client: &BackofficeClient, json: bool) -> CommandResult
where
    R: Resource,
    R::Record: Serialize + Display,
{
    let editor = load_editor::<R>(client).await?;

    if json {
        for record in editor.records() {
            output_json(record);
        }
        return Ok(());
    }

    if editor.records().is_empty() {
        println!("No {}s found", R::NOUN);
        return Ok(());
    }
    for record in editor.records() {
        println!("{}  {record}", R::record_id(record));
    }
    println!("\n{} {}(s)", editor.records().len(), R::NOUN);
    Ok(())
}

async fn submit<R: Resource>(editor: &mut ResourceEditor<R>) -> CommandResult {
    match editor.submit().await? {
        SubmitOutcome::Created => println!("✅ Created {}", R::NOUN),
        SubmitOutcome::Updated { id } => println!("✅ Updated {} {id}", R::NOUN),
    }
    Ok(())
}

async fn handle_delete<R>(client: &BackofficeClient, id: &str, yes: bool) -> CommandResult
where
    R: Resource,
    R::Record: Display,
{
    let mut editor = load_editor::<R>(client).await?;
    match editor.find(id) {
        Some(record) => println!("{record}"),
        None => log::warn!("{} {id} is not in the current list", R::NOUN),
    }

    let confirm = |prompt: &str| yes || ask_for_confirmation(prompt);
    match editor.delete(id, &confirm).await? {
        DeleteOutcome::Deleted => println!("🗑️  Deleted {} {id}", R::NOUN),
        DeleteOutcome::Declined => println!("Nothing deleted"),
    }
    Ok(())
}

pub async fn handle_artists(client: &BackofficeClient, command: ArtistCommands) -> CommandResult {
    match command {
        ArtistCommands::List { json } => handle_list::<ArtistResource>(client, json).await,
        ArtistCommands::Create {
            name,
            genre,
            popularity,
        } => {
            let mut editor = ResourceEditor::<ArtistResource>::new(client.clone());
            *editor.draft_mut() = ArtistDraft {
                name,
                genre,
                popularity,
            };
            submit(&mut editor).await
        }
        ArtistCommands::Update {
            id,
            name,
            genre,
            popularity,
        } => {
            let mut editor = load_editor::<ArtistResource>(client).await?;
            editor.edit_by_id(&id)?;

            let draft = editor.draft_mut();
            if let Some(name) = name {
                draft.name = name;
            }
            if let Some(genre) = genre {
                draft.genre = genre;
            }
            if let Some(popularity) = popularity {
                draft.popularity = popularity;
            }
            submit(&mut editor).await
        }
        ArtistCommands::Delete { id, yes } => {
            handle_delete::<ArtistResource>(client, &id, yes).await
        }
    }
}

pub async fn handle_albums(client: &BackofficeClient, command: AlbumCommands) -> CommandResult {
    match command {
        AlbumCommands::List { json } => handle_list::<AlbumResource>(client, json).await,
        AlbumCommands::Create {
            title,
            genre,
            release_date,
            artist,
        } => {
            let mut editor = ResourceEditor::<AlbumResource>::new(client.clone());
            *editor.draft_mut() = AlbumDraft {
                title,
                genre,
                release_date,
                artist_id: artist,
            };
            submit(&mut editor).await
        }
        AlbumCommands::Update {
            id,
            title,
            genre,
            release_date,
            artist,
        } => {
            let mut editor = load_editor::<AlbumResource>(client).await?;
            editor.edit_by_id(&id)?;

            let draft = editor.draft_mut();
            if let Some(title) = title {
                draft.title = title;
            }
            if let Some(genre) = genre {
                draft.genre = genre;
            }
            if let Some(release_date) = release_date {
                draft.release_date = release_date;
            }
            if let Some(artist) = artist {
                draft.artist_id = artist;
            }
            submit(&mut editor).await
        }
        AlbumCommands::Delete { id, yes } => handle_delete::<AlbumResource>(client, &id, yes).await,
        AlbumCommands::Tracks { id } => {
            let tracks = AlbumTracks::new(client, &id).list().await?;
            if tracks.is_empty() {
                println!("Album {id} has no tracks");
            }
            for (i, track) in tracks.iter().enumerate() {
                let duration = track.duration_display().unwrap_or_default();
                println!("{:>3}. {}  {} {duration}", i + 1, track.id, track.title);
            }
            Ok(())
        }
        AlbumCommands::AddTrack { album, track } => {
            AlbumTracks::new(client, &album).add(&track).await?;
            println!("✅ Added track {track} to album {album}");
            Ok(())
        }
        AlbumCommands::RemoveTrack { album, track } => {
            AlbumTracks::new(client, &album).remove(&track).await?;
            println!("✅ Removed track {track} from album {album}");
            Ok(())
        }
        AlbumCommands::MoveTrack { album, from, to } => {
            let album_tracks = AlbumTracks::new(client, &album);
            let mut ids: Vec<String> = album_tracks
                .list()
                .await?
                .into_iter()
                .map(|track| track.id)
                .collect();

            let moved = match (from.checked_sub(1), to.checked_sub(1)) {
                (Some(from), Some(to)) => move_item(&mut ids, from, to),
                _ => false,
            };
            if !moved {
                return Err(format!(
                    "Positions must be between 1 and {} (got {from} and {to})",
                    ids.len()
                )
                .into());
            }

            album_tracks.reorder(&ids).await?;
            println!("✅ Moved track {from} to position {to}");
            Ok(())
        }
    }
}

pub async fn handle_tracks(
    client: &BackofficeClient,
    store: &AppStateStore,
    command: TrackCommands,
) -> CommandResult {
    match command {
        TrackCommands::List { json } => handle_list::<TrackResource>(client, json).await,
        TrackCommands::Create {
            title,
            artist,
            album,
            genre,
            audio,
        } => {
            ensure_logged_in(client, store).await?;
            let audio = AudioFile::from_path(&audio)?;
            println!("📤 Uploading {} ({})", audio.file_name, audio.mime_type);

            let mut editor = ResourceEditor::<TrackResource>::new(client.clone());
            *editor.draft_mut() = TrackDraft {
                title,
                artist_id: artist,
                album_id: album,
                genre: genre.unwrap_or_default(),
                audio: Some(audio),
            };
            submit(&mut editor).await
        }
        TrackCommands::Update {
            id,
            title,
            artist,
            album,
            genre,
            audio,
        } => {
            ensure_logged_in(client, store).await?;
            let mut editor = load_editor::<TrackResource>(client).await?;
            editor.edit_by_id(&id)?;

            let draft = editor.draft_mut();
            if let Some(title) = title {
                draft.title = title;
            }
            if let Some(artist) = artist {
                draft.artist_id = artist;
            }
            if let Some(album) = album {
                draft.album_id = album;
            }
            if let Some(genre) = genre {
                draft.genre = genre;
            }
            if let Some(path) = audio {
                draft.audio = Some(AudioFile::from_path(&path)?);
            }
            submit(&mut editor).await
        }
        TrackCommands::Delete { id, yes } => handle_delete::<TrackResource>(client, &id, yes).await,
    }
}

pub async fn handle_playlists(
    client: &BackofficeClient,
    command: PlaylistCommands,
) -> CommandResult {
    match command {
        PlaylistCommands::List { json } => handle_list::<PlaylistResource>(client, json).await,
        PlaylistCommands::Create { name, tracks } => {
            let mut draft = PlaylistDraft {
                name,
                track_ids: Vec::new(),
            };
            for track in tracks {
                if !draft.is_selected(&track) {
                    draft.toggle_track(&track);
                }
            }

            let mut editor = ResourceEditor::<PlaylistResource>::new(client.clone());
            *editor.draft_mut() = draft;
            submit(&mut editor).await
        }
        PlaylistCommands::Update { id, name, toggle } => {
            let mut editor = load_editor::<PlaylistResource>(client).await?;
            editor.edit_by_id(&id)?;

            let draft = editor.draft_mut();
            if let Some(name) = name {
                draft.name = name;
            }
            for track in toggle {
                if draft.toggle_track(&track) {
                    println!("➕ {track}");
                } else {
                    println!("➖ {track}");
                }
            }
            submit(&mut editor).await
        }
        PlaylistCommands::Delete { id, yes } => {
            handle_delete::<PlaylistResource>(client, &id, yes).await
        }
    }
}
