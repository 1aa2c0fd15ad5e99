//! Version tags and constraint-pattern matching
//!
//! Version tags take the form `v<major>.<minor>.<patch>`, optionally followed
//! by further integer components denoting forked builds nested under the base
//! release (`v1.2.3.2` is a fork of `v1.2.3`). A constraint pattern replaces
//! any trailing run of segments with the wildcard `x`:
//!
//! - `v1.2.3` is an exact version (forked builds beneath it still win)
//! - `v1.2.x` is the highest v1.2 release
//! - `v1.x.x` is the highest v1 release
//!
//! [`latest_tag_by_pattern`] resolves a pattern against a set of known tags
//! to the single numerically greatest tag consistent with it. It is pure and
//! shared by every provider variant, so all variants agree on what "latest"
//! means.
//!
//! # Examples
//!
//! ```
//! use bundlekit::latest_tag_by_pattern;
//!
//! let tags = vec!["v1.2.3".to_string(), "v1.4.2.2".to_string()];
//! let best = latest_tag_by_pattern("maps-panel", &tags, "v1.x.x").unwrap();
//! assert_eq!(best, "v1.4.2.2");
//! ```

use crate::{Error, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// One level of the version trie; keys are integer version components
///
/// The trie is keyed recursively by each component, so the tags v1.2.1,
/// v1.2.3 and v1.2.3.2 produce the paths 1→2→1, 1→2→3 and 1→2→3→2. Keying
/// by integer makes "numerically greatest" a plain `BTreeMap` max, so 10
/// beats 9 at every level.
#[derive(Debug, Default)]
struct VersionTrie {
    children: BTreeMap<u64, VersionTrie>,
}

impl VersionTrie {
    fn insert(&mut self, components: &[u64]) {
        let mut current = self;
        for &component in components {
            current = current.children.entry(component).or_default();
        }
    }
}

/// Parse a version tag into its integer components
///
/// Returns `None` unless the tag is a leading `v` followed by at least three
/// dot-separated non-negative integers.
fn parse_tag(tag: &str) -> Option<Vec<u64>> {
    let components: Vec<u64> = tag
        .strip_prefix('v')?
        .split('.')
        .map(|part| part.parse().ok())
        .collect::<Option<_>>()?;

    if components.len() < 3 {
        return None;
    }
    Some(components)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PatternSegment {
    Exact(u64),
    Wildcard,
}

fn pattern_grammar() -> &'static Regex {
    static GRAMMAR: OnceLock<Regex> = OnceLock::new();
    GRAMMAR.get_or_init(|| {
        Regex::new(r"^v([0-9]+|x)(\.([0-9]+|x)){2,}$").expect("pattern grammar regex is valid")
    })
}

/// Validate a pattern against the grammar and split it into segments
///
/// Rejects patterns with fewer than three segments, a missing `v` prefix,
/// or a concrete digit segment following a wildcard (`v1.x.2`).
fn parse_pattern(pattern: &str) -> Result<Vec<PatternSegment>> {
    if !pattern_grammar().is_match(pattern) {
        return Err(Error::InvalidVersionPattern(pattern.to_string()));
    }

    let mut segments = Vec::new();
    let mut seen_wildcard = false;

    for part in pattern[1..].split('.') {
        let segment = if part == "x" {
            seen_wildcard = true;
            PatternSegment::Wildcard
        } else {
            if seen_wildcard {
                // no digit may pin a level below a wildcard, eg. v1.x.2
                return Err(Error::InvalidVersionPattern(pattern.to_string()));
            }
            let value = part
                .parse()
                .map_err(|_| Error::InvalidVersionPattern(pattern.to_string()))?;
            PatternSegment::Exact(value)
        };
        segments.push(segment);
    }

    Ok(segments)
}

/// Resolve a constraint pattern against a set of known version tags
///
/// Tags that do not parse as version tags are skipped silently. The match
/// descends a trie of integer components one pattern segment at a time:
/// a concrete segment must exist at the current level, a wildcard takes the
/// numerically greatest key. Once the pattern is consumed, any remaining trie
/// levels (forked builds under the matched base) are descended by numeric
/// max, so an exact `v1.2.3` still prefers `v1.2.3.9` over `v1.2.3` when
/// both exist.
///
/// # Arguments
///
/// * `system_name` - Short bundle name used in error messages
/// * `tags` - Known version tag strings, e.g. `["v1.2.3", "v1.2.5"]`
/// * `pattern` - Constraint pattern, e.g. `"v1.x.x"`
///
/// # Errors
///
/// [`Error::InvalidVersionPattern`] if the pattern fails the grammar, and
/// [`Error::NoMatchingVersion`] (listing every input tag) if the pattern is
/// well-formed but no tag satisfies it.
pub fn latest_tag_by_pattern(system_name: &str, tags: &[String], pattern: &str) -> Result<String> {
    let segments = parse_pattern(pattern)?;

    let mut trie = VersionTrie::default();
    for tag in tags {
        if let Some(components) = parse_tag(tag) {
            trie.insert(&components);
        }
    }

    let no_match = || Error::NoMatchingVersion {
        name: system_name.to_string(),
        pattern: pattern.to_string(),
        available: tags.join(", "),
    };

    let mut current = &trie;
    let mut chosen: Vec<u64> = Vec::new();

    for segment in segments {
        let component = match segment {
            PatternSegment::Exact(value) => value,
            PatternSegment::Wildcard => {
                // the wildcard resolves to the numerically greatest key here
                match current.children.last_key_value() {
                    Some((&max, _)) => max,
                    None => return Err(no_match()),
                }
            }
        };

        current = current.children.get(&component).ok_or_else(no_match)?;
        chosen.push(component);
    }

    // the pattern is satisfied, but forked builds may be nested beneath the
    // matched base; keep taking the greatest component until a leaf
    while let Some((&max, child)) = current.children.last_key_value() {
        chosen.push(max);
        current = child;
    }

    let joined = chosen
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(".");

    Ok(format!("v{}", joined))
}
