//! Stats command implementation.
//!
//! Lists the iostat statistics that are dispatched and their metric names.

use herakles_iostat_exporter::dispatch::STAT_METRICS;

/// Lists the statistic mapping table, optionally restricted to one kind.
pub fn command_stats(kind: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    println!("📊 Herakles iostat Exporter - Recognized Statistics");
    println!("===================================================");

    if let Some(kind) = &kind {
        if !["gauge", "counter", "percent"].contains(&kind.as_str()) {
            return Err(format!(
                "Invalid kind '{}', expected 'gauge', 'counter' or 'percent'",
                kind
            )
            .into());
        }
    }

    let mut rows: Vec<_> = STAT_METRICS
        .iter()
        .filter(|(_, spec)| kind.as_deref().map_or(true, |k| spec.kind.as_str() == k))
        .collect();
    rows.sort_by_key(|(statistic, _)| *statistic);

    println!("\n   {:<14} {:<12} {}", "iostat column", "metric", "type");
    println!("   {}", "─".repeat(36));
    for (statistic, spec) in &rows {
        println!("   {:<14} {:<12} {}", statistic, spec.name, spec.kind);
    }

    println!("\n📋 Total: {} statistics", rows.len());
    Ok(())
}
