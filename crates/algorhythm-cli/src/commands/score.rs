use anyhow::{Context as _, Result};
use std::path::Path;

use algorhythm_dna::{score_track, Dna, ScoreReport};

use super::Context;

pub async fn run_score(
    ctx: &Context,
    track: &str,
    dna_path: Option<&Path>,
    playlist: Option<&str>,
    exclude: &[usize],
) -> Result<()> {
    let candidate = ctx.candidate(track).await?;

    let report = match (dna_path, playlist) {
        (Some(path), _) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read descriptor {}", path.display()))?;
            let dna = Dna::from_json(&json)?;
            score_track(&candidate, &dna)?
        }
        (None, Some(playlist)) => {
            let mut session = ctx.load_session(playlist).await?;
            if !exclude.is_empty() {
                session.exclude(exclude)?;
            }
            session.build_dna()?;
            session.score(&candidate)?
        }
        (None, None) => anyhow::bail!("Either --dna or --playlist is required"),
    };

    if ctx.emit_json(&report)? {
        return Ok(());
    }
    print_report(&report);
    Ok(())
}

fn print_report(report: &ScoreReport) {
    let s = &report.scores;
    let w = &report.weights;
    println!("\n🎯 {} - {}", report.song, report.artist);
    println!("   vs. {}\n", report.playlist);
    println!("  Cosine similarity:  {:.4}  (weight {:.2})", s.cosine_similarity, w.cosine);
    println!("  Mahalanobis fit:    {:.4}  (weight {:.2})", s.mahalanobis_fit, w.mahalanobis);
    println!("  Isolation forest:   {:.4}  (weight {:.2})", s.isolation_forest, w.isolation);
    println!("  Composite:          {:.4}", s.composite);
    println!("\n  Verdict: {}", report.verdict);
}
