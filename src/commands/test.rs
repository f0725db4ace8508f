//! Test command implementation.
//!
//! Runs collection cycles and displays the merged statistics.

use std::collections::BTreeMap;
use std::time::Instant;

use herakles_iostat_exporter::dispatch::lookup;
use herakles_iostat_exporter::{collect, DeviceStatMap};

use crate::cli::ConfigFormat;
use crate::config::Config;

/// Runs collection cycles and prints their results.
pub async fn command_test(
    iterations: usize,
    verbose: bool,
    format: ConfigFormat,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("🧪 Herakles iostat Exporter - Test Mode");
    println!("=======================================");

    let runner = config.command_runner();
    let filter = config.device_filter();
    let mut failures = 0;

    for iteration in 1..=iterations {
        println!("\n🔄 Iteration {}/{}:", iteration, iterations);

        let start = Instant::now();
        let result = collect(runner.as_ref(), &filter, config.interval(), config.count()).await;
        let duration = start.elapsed();

        match result {
            Ok(stats) => {
                println!(
                    "   ⏱️  Collection duration: {:.2}ms",
                    duration.as_secs_f64() * 1000.0
                );
                println!("   💽 Devices: {}", stats.len());
                println!("{}", render_stats(&stats, &format)?);

                if verbose {
                    print_dispatch_mapping(&stats);
                }
            }
            Err(e) => {
                failures += 1;
                println!("   ❌ Collection failed: {}", e);
            }
        }
    }

    if failures > 0 {
        return Err(format!("{} of {} collection cycles failed", failures, iterations).into());
    }

    println!("\n✅ Test completed successfully");
    Ok(())
}

fn render_stats(
    stats: &DeviceStatMap,
    format: &ConfigFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    Ok(match format {
        ConfigFormat::Json => serde_json::to_string_pretty(stats)?,
        ConfigFormat::Toml => toml::to_string_pretty(stats)?,
        ConfigFormat::Yaml => serde_yaml::to_string(stats)?,
    })
}

/// Prints how each statistic would be dispatched.
fn print_dispatch_mapping(stats: &DeviceStatMap) {
    let mut dropped: BTreeMap<&str, usize> = BTreeMap::new();

    for (device, items) in stats {
        println!("   ├─ {}", device);
        for (statistic, value) in items {
            match lookup(statistic) {
                Some(metric) => println!(
                    "   │  ├─ {:<12} -> {}/{} = {}",
                    statistic, metric.kind, metric.name, value
                ),
                None => *dropped.entry(statistic.as_str()).or_default() += 1,
            }
        }
    }

    if !dropped.is_empty() {
        let names: Vec<&str> = dropped.keys().copied().collect();
        println!("   └─ Not dispatched: {}", names.join(", "));
    }
}
