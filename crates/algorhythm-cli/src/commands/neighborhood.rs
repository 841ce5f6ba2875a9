use anyhow::Result;
use petgraph::dot::Dot;

use algorhythm_core::entity_id_from_url;
use algorhythm_graph::build_neighborhood;

use super::Context;

pub async fn run_neighborhood(ctx: &Context, artist: &str, max: usize, dot: bool) -> Result<()> {
    let artist_id = entity_id_from_url(artist);
    let graph = build_neighborhood(ctx.catalog.as_ref(), artist_id, max, &ctx.tuning).await?;

    if dot {
        println!("{}", Dot::new(&graph.to_graph()));
        return Ok(());
    }
    if ctx.emit_json(&graph)? {
        return Ok(());
    }

    let root = &graph.root;
    println!(
        "\n🕸  {} (popularity {}, {})\n",
        root.name,
        root.popularity,
        if root.genres.is_empty() {
            "no genres".to_string()
        } else {
            root.genres.join(", ")
        }
    );
    println!("  {} neighbors found\n", graph.total_found);
    for (rank, n) in graph.neighbors.iter().enumerate() {
        println!(
            "  {:>2}. {:<28} pop {:>3}  relevance {:.3}  via {}",
            rank + 1,
            n.name,
            n.popularity,
            n.relevance_score,
            n.matched_genre
        );
    }
    Ok(())
}
