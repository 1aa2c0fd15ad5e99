//! Fetch command - bring a bundle into the local cache

use anyhow::Result;
use bundlekit::{descriptor_from_uri, Config};
use indicatif::{ProgressBar, ProgressStyle};

pub fn run(uri: String) -> Result<()> {
    let config = Config::load()?;
    let descriptor = descriptor_from_uri(&config, &uri)?;

    if let Some(path) = descriptor.path() {
        println!("Already cached: {}", path.display());
        return Ok(());
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!(
        "Fetching {} {}...",
        descriptor.system_name(),
        descriptor.version()
    ));
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));

    let result = descriptor.ensure_local();
    spinner.finish_and_clear();
    result?;

    match descriptor.path() {
        Some(path) => println!(
            "Fetched {} {} -> {}",
            descriptor.system_name(),
            descriptor.version(),
            path.display()
        ),
        None => println!("Fetched {} {}", descriptor.system_name(), descriptor.version()),
    }

    Ok(())
}
