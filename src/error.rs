use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML deserialize error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Malformed descriptor: {0}")]
    MalformedDescriptor(String),

    #[error("Cannot parse version pattern '{0}'\n\n\
             Hint: Patterns take the form v<digits|x>.<digits|x>.<digits|x> with\n\
             at least three segments, and no digit segment may follow an 'x'.\n\n\
             Examples:\n\
             - v1.2.3    exact version (still resolves forked builds beneath it)\n\
             - v1.2.x    highest v1.2 release\n\
             - v1.x.x    highest v1 release")]
    InvalidVersionPattern(String),

    #[error("'{name}' has no version matching the pattern '{pattern}'. \
             Available versions are: {available}")]
    NoMatchingVersion {
        name: String,
        pattern: String,
        available: String,
    },

    #[error("Bundle metadata file '{0}' missing\n\n\
             Hint: Every bundle exposes a bundle.yml at its root. This bundle was\n\
             fetched but its payload does not follow the bundle directory contract.")]
    MetadataMissing(PathBuf),

    #[error("Provider failure: {0}")]
    ProviderFailure(String),

    #[error("{0}")]
    Other(String),
}
