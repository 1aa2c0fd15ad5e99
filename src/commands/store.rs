//! Store commands - manage the local bundle store

use anyhow::Result;
use bundlekit::Config;

pub fn run(action: &crate::StoreAction) -> Result<()> {
    use crate::StoreAction;

    match action {
        StoreAction::Init => init(),
        StoreAction::Add {
            path,
            name,
            version,
        } => add(path, name, version),
        StoreAction::List => list(),
        StoreAction::Deprecate {
            name,
            version,
            message,
            clear,
        } => deprecate(name, version, message.clone(), *clear),
    }
}

fn init() -> Result<()> {
    let store = Config::load()?.store();
    store.init()?;
    println!("Initialized bundle store at {}", store.root().display());
    Ok(())
}

fn add(path: &str, name: &str, version: &str) -> Result<()> {
    let store = Config::load()?.store();
    let tarball = store.publish(path, name, version)?;
    println!("Published {} {} ({})", name, version, tarball.display());
    Ok(())
}

fn list() -> Result<()> {
    let store = Config::load()?.store();
    let names = store.list_bundles()?;

    if names.is_empty() {
        println!("(store is empty)");
        println!();
        println!("Publish a bundle with: bundlekit store add <path> <name> <version>");
        return Ok(());
    }

    for name in names {
        let index = store.load_index(&name)?;
        let latest = index
            .releases
            .last()
            .map(|r| r.version.clone())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}  {} release(s), latest {}",
            index.name,
            index.releases.len(),
            latest
        );
    }

    Ok(())
}

fn deprecate(name: &str, version: &str, message: Option<String>, clear: bool) -> Result<()> {
    let store = Config::load()?.store();

    if clear {
        store.set_deprecation(name, version, None)?;
        println!("Cleared deprecation on {} {}", name, version);
    } else {
        let note = message.unwrap_or_else(|| "deprecated".to_string());
        store.set_deprecation(name, version, Some(note))?;
        println!("Deprecated {} {}", name, version);
    }

    Ok(())
}
