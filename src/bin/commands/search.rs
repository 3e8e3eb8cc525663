use super::utils::output_json;
use catalog_backoffice::search::SuggestionUpdate;
use catalog_backoffice::{BackofficeClient, SuggestionBox};

pub async fn handle_search(
    client: &BackofficeClient,
    query: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let results = client.search(query).await?;

    if json {
        output_json(&results);
        return Ok(());
    }

    println!("🔍 Results for \"{query}\"");
    if results.is_empty() {
        println!("   Nothing found.");
        return Ok(());
    }

    for (title, items) in results.sections() {
        if items.is_empty() {
            continue;
        }
        println!("\n{title}");
        for item in items.iter().take(5) {
            println!("   {item}");
        }
        if items.len() > 5 {
            println!("   ... and {} more", items.len() - 5);
        }
    }
    Ok(())
}

pub async fn handle_suggest(
    client: &BackofficeClient,
    query: &str,
    as_typed: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let suggestion_box = SuggestionBox::for_client(client);

    if as_typed {
        let prefixes: Vec<String> = query
            .char_indices()
            .map(|(i, c)| query[..i + c.len_utf8()].to_string())
            .collect();
        let updates = prefixes.iter().map(|prefix| suggestion_box.update(prefix));

        for (prefix, outcome) in prefixes.iter().zip(futures::future::join_all(updates).await) {
            match outcome {
                Ok(SuggestionUpdate::Discarded) => log::debug!("'{prefix}': discarded (stale)"),
                Ok(SuggestionUpdate::Superseded) => log::debug!("'{prefix}': superseded"),
                Ok(_) => {}
                Err(e) => log::warn!("'{prefix}': {e}"),
            }
        }
    } else {
        suggestion_box.update(query).await?;
    }

    let suggestions = suggestion_box.suggestions();
    if suggestions.is_empty() {
        println!("No suggestions for \"{}\"", suggestion_box.query());
    }
    for suggestion in suggestions {
        println!("{suggestion}");
    }
    Ok(())
}
