use anyhow::Result;

use algorhythm_core::entity_id_from_url;
use algorhythm_graph::find_sonic_twins;

use super::Context;

pub async fn run_twins(ctx: &Context, track: &str, artist: &str, top: Option<usize>) -> Result<()> {
    let top_n = top.unwrap_or(ctx.tuning.twins.default_top_n);
    let result = find_sonic_twins(
        ctx.catalog.as_ref(),
        ctx.features.as_ref(),
        entity_id_from_url(track),
        entity_id_from_url(artist),
        top_n,
        &ctx.tuning,
    )
    .await?;

    if ctx.emit_json(&result)? {
        return Ok(());
    }

    println!(
        "\n👯 Sonic twins of {} - {}\n",
        result.target.name, result.target.artist
    );
    println!("  Compared {} artists\n", result.total_compared);
    for (rank, twin) in result.twins.iter().enumerate() {
        println!(
            "  {:>2}. {:<28} {:>6.2}% match  (avg {:.2}, min {:.2}, {} tracks)",
            rank + 1,
            twin.artist_name,
            twin.similarity_pct,
            twin.avg_distance,
            twin.min_distance,
            twin.tracks_analyzed
        );
        for closest in &twin.closest_tracks {
            println!("        {} ({:.2})", closest.name, closest.distance);
        }
    }
    Ok(())
}
