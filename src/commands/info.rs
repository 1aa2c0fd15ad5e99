//! Info command - show a bundle's manifest

use anyhow::Result;
use bundlekit::{descriptor_from_uri, Config};

pub fn run(uri: String) -> Result<()> {
    let config = Config::load()?;
    let descriptor = descriptor_from_uri(&config, &uri)?;

    let manifest = descriptor.manifest()?;

    let display_name = manifest
        .display_name
        .clone()
        .unwrap_or_else(|| descriptor.system_name());
    println!("{} ({})", display_name, descriptor.version());

    if let Some(description) = &manifest.description {
        println!("  {}", description);
    }

    if let Some(required) = &manifest.requires_runtime_version {
        println!("  requires runtime: {}", required);
    }

    let status = descriptor.deprecation_status()?;
    if status.is_deprecated {
        match status.message {
            Some(message) => println!("  DEPRECATED: {}", message),
            None => println!("  DEPRECATED"),
        }
    }

    let changelog = descriptor.changelog()?;
    if let Some(summary) = changelog.summary {
        println!("  changelog: {}", summary);
    }
    if let Some(url) = changelog.url {
        println!("  changelog url: {}", url);
    }

    if manifest.configuration.is_empty() {
        println!("  (no configuration parameters)");
    } else {
        println!("  configuration:");
        for (name, item) in &manifest.configuration {
            let mut line = format!("    {} ({})", name, item.value_type);
            if let Some(description) = &item.description {
                line.push_str(&format!(" - {}", description));
            }
            println!("{}", line);
        }
    }

    Ok(())
}
