//! Latest command - resolve the newest version a bundle's source knows

use anyhow::Result;
use bundlekit::{descriptor_from_uri, Config};

pub fn run(uri: String, pattern: Option<String>) -> Result<()> {
    let config = Config::load()?;
    let descriptor = descriptor_from_uri(&config, &uri)?;

    let latest = descriptor.latest(pattern.as_deref())?;

    match &pattern {
        Some(pattern) => println!(
            "Latest {} matching {}: {}",
            descriptor.system_name(),
            pattern,
            latest.version()
        ),
        None => println!("Latest {}: {}", descriptor.system_name(), latest.version()),
    }
    println!("  {}", latest.uri()?);

    if latest.version() != descriptor.version() {
        println!("  (currently pinned to {})", descriptor.version());
    }

    Ok(())
}
