//! Info command - show version, locations and provider status

use anyhow::Result;

use crate::ai::router::{self, ProviderKind};
use crate::config::{self, Config};

pub fn run(config: &Config) -> Result<()> {
    println!("cmdforge v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("System Information:");
    println!("  OS: {} {}", std::env::consts::OS, std::env::consts::ARCH);

    println!();
    println!("Locations:");
    println!("  Config file: {}", display_path(config::config_path()));
    println!("  Data dir: {}", display_path(config.data_dir()));

    println!();
    println!("AI Providers:");
    let active = router::active_provider(config).ok();
    for kind in ProviderKind::ALL {
        let status = if router::is_configured(config, kind) {
            "configured"
        } else {
            "not configured"
        };
        let marker = if Some(kind) == active { " (active)" } else { "" };
        println!("  {}: {}{}", kind.name(), status, marker);
    }

    println!();
    println!("Context: {}", if config.context.enabled { "enabled" } else { "disabled" });

    Ok(())
}

fn display_path(path: Result<std::path::PathBuf>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}
