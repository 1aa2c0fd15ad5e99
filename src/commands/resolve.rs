//! Resolve command - show what a descriptor URI points at

use anyhow::Result;
use bundlekit::{descriptor_from_uri, Config};

pub fn run(uri: String) -> Result<()> {
    let config = Config::load()?;
    let descriptor = descriptor_from_uri(&config, &uri)?;

    println!("{}", descriptor.uri()?);
    println!(
        "  source:  {}",
        descriptor.identity().descriptor_type().unwrap_or("?")
    );
    println!("  name:    {}", descriptor.system_name());
    println!("  version: {}", descriptor.version());

    for (key, value) in descriptor.identity().fields() {
        if !matches!(key, "type" | "name" | "version") {
            println!("  {}: {}", key, value);
        }
    }

    match descriptor.path() {
        Some(path) => println!("  cached:  {}", path.display()),
        None => println!("  cached:  (not local; run `bundlekit fetch` to cache it)"),
    }

    Ok(())
}
