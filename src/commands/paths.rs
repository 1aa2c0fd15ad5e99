//! Paths command - list the cache locations probed for a descriptor

use anyhow::Result;
use bundlekit::{descriptor_from_uri, BundleManifest, Config};

pub fn run(uri: String) -> Result<()> {
    let config = Config::load()?;
    let descriptor = descriptor_from_uri(&config, &uri)?;

    println!(
        "Cache candidates for {} {} (probed in order):",
        descriptor.system_name(),
        descriptor.version()
    );

    for candidate in descriptor.cache_paths() {
        let marker = if BundleManifest::exists(&candidate) {
            "*"
        } else {
            " "
        };
        println!("  {} {}", marker, candidate.display());
    }

    Ok(())
}
