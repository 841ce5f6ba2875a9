use anyhow::{Context as _, Result};
use serde::Serialize;
use std::path::Path;

use algorhythm_dna::{CohesionReport, Exclusion};

use super::Context;

#[derive(Serialize)]
struct DnaOutput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    exclusion: Option<&'a Exclusion>,
    report: &'a CohesionReport,
}

pub async fn run_dna(
    ctx: &Context,
    playlist: &str,
    exclude: &[usize],
    out: Option<&Path>,
) -> Result<()> {
    let mut session = ctx.load_session(playlist).await?;

    let exclusion = if exclude.is_empty() {
        None
    } else {
        Some(session.exclude(exclude)?)
    };

    let dna = session.build_dna()?;
    let report = session.report(&ctx.tuning)?;

    if let Some(out) = out {
        std::fs::write(out, dna.to_json()?)
            .with_context(|| format!("Failed to write descriptor to {}", out.display()))?;
        log::info!("saved DNA to {}", out.display());
    }

    let output = DnaOutput {
        exclusion: exclusion.as_ref(),
        report: &report,
    };
    if ctx.emit_json(&output)? {
        return Ok(());
    }

    println!("\n🧬 {} ({} tracks)\n", report.playlist_name, report.track_count);
    for (position, track) in session.tracks().iter().enumerate() {
        println!("  {:>3}. {} - {}", position + 1, track.name, track.artist);
    }
    if let Some(exclusion) = &exclusion {
        println!(
            "\n  Excluded {} track(s), {} remaining",
            exclusion.excluded_count, exclusion.remaining_count
        );
    }

    println!("\n  Cohesion score: {}", report.cohesion_score);

    println!("\n  Feature profile:");
    for (feature, profile) in &report.feature_profile {
        println!(
            "    {:<17} mean {:>9.4}  std {:>8.4}  range {:>8.4}",
            feature.name(),
            profile.mean,
            profile.std,
            profile.range
        );
    }

    println!("\n  Conviction:");
    for c in &report.conviction_breakdown {
        println!(
            "    {:<17} {:.3}  (tightness {:.3}, identity {:.3})",
            c.feature.name(),
            c.conviction,
            c.tightness,
            c.identity
        );
    }

    let pca = &report.pca_breakdown;
    println!(
        "\n  PCA: {} of {} dimensions explain 90% (top 3: {}%)",
        pca.dims_for_90pct, pca.total_dims, pca.top3_explained_pct
    );

    if !report.correlated_features.is_empty() {
        println!("\n  Correlated features:");
        for pair in &report.correlated_features {
            println!(
                "    {} ~ {}: {} ({:?})",
                pair.feature_a, pair.feature_b, pair.correlation, pair.direction
            );
        }
    }

    if !report.dominant_traits.is_empty() {
        println!("\n  Dominant traits:");
        for t in &report.dominant_traits {
            println!(
                "    {:<17} {:?} {} ({:+}%)",
                t.feature.name(),
                t.direction,
                t.value,
                t.deviation_pct
            );
        }
    }

    if !report.key_distribution.is_empty() {
        let keys: Vec<String> = report
            .key_distribution
            .iter()
            .map(|(key, count)| format!("{key}:{count}"))
            .collect();
        println!("\n  Keys: {}", keys.join(" "));
    }
    if !report.mode_distribution.is_empty() {
        let modes: Vec<String> = report
            .mode_distribution
            .iter()
            .map(|(mode, count)| format!("{}:{count}", if *mode == 1 { "major" } else { "minor" }))
            .collect();
        println!("  Modes: {}", modes.join(" "));
    }

    if dna.used_pseudo_inverse() {
        println!("\n  Note: covariance was singular; Mahalanobis uses a pseudo-inverse");
    }

    Ok(())
}
