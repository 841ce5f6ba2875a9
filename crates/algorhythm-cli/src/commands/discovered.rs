use anyhow::Result;

use algorhythm_core::entity_id_from_url;
use algorhythm_graph::discovered_on;

use super::Context;

pub async fn run_discovered_on(ctx: &Context, artist: &str) -> Result<()> {
    let found = discovered_on(ctx.catalog.as_ref(), entity_id_from_url(artist), &ctx.tuning).await?;

    if ctx.emit_json(&found)? {
        return Ok(());
    }

    println!(
        "\n📻 {} appears on {} playlists\n",
        found.artist.name, found.total_found
    );
    for playlist in &found.playlists {
        let marker = if playlist.is_editorial { "★" } else { " " };
        println!(
            "  {marker} {:<36} {:>9} followers  by {}",
            playlist.name, playlist.followers, playlist.owner
        );
    }

    if !found.entry_points.is_empty() {
        println!("\n  Entry points:");
        for playlist in &found.entry_points {
            println!("    {} ({})", playlist.name, playlist.url);
        }
    }
    Ok(())
}
