//! Check command implementation.
//!
//! Validates system requirements and configuration.

use herakles_iostat_exporter::collect;

use crate::config::{validate_effective_config, Config};
use crate::startup_checks::{check_iostat_binary, validate_requirements};

/// Validates system requirements and configuration.
pub async fn command_check(
    run_collection: bool,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Herakles iostat Exporter - System Check");
    println!("==========================================");

    let mut all_ok = true;

    println!("\n⚙️  Checking configuration...");
    match validate_effective_config(config) {
        Ok(_) => println!("   ✅ Configuration is valid"),
        Err(e) => {
            println!("   ❌ Configuration invalid: {}", e);
            all_ok = false;
        }
    }
    for key in config.unknown_keys() {
        println!("   ⚠️  Ignoring unknown config option: {}", key);
    }

    if config.uses_captured_reports() {
        println!("\n📄 Using captured reports, skipping iostat checks");
    } else {
        println!("\n💽 Checking iostat and /proc/diskstats...");
        let binary = config.iostat_binary();
        match validate_requirements(&binary) {
            Ok(_) => println!("   ✅ iostat and /proc/diskstats available"),
            Err(e) => {
                println!("   ❌ {}", e);
                all_ok = false;
                if check_iostat_binary(&binary).is_err() {
                    println!("   💡 Install sysstat or pass --iostat-binary");
                }
            }
        }
    }

    if run_collection {
        println!("\n🔄 Running one collection cycle...");
        let runner = config.command_runner();
        let filter = config.device_filter();
        match collect(runner.as_ref(), &filter, config.interval(), config.count()).await {
            Ok(stats) => {
                println!("   ✅ Collected {} device(s)", stats.len());
                for (device, items) in &stats {
                    println!("   ├─ {} ({} statistics)", device, items.len());
                }
            }
            Err(e) => {
                println!("   ❌ Collection failed: {}", e);
                all_ok = false;
            }
        }
    }

    println!("\n📋 Summary:");
    if all_ok {
        println!("   ✅ All checks passed - system is ready");
        Ok(())
    } else {
        println!("   ❌ Some checks failed - please review warnings");
        std::process::exit(1);
    }
}
