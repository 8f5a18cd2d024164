//! Human-readable option listings and the `opt.txt` snapshot.

use std::{collections::BTreeMap, fs, path::Path};

use crate::{
    config::Options,
    error::{OptionsError, OptionsResult},
};

/// First line of every listing.
pub const HEADER: &str = "------------ Options -------------";
/// Last line of every listing.
pub const FOOTER: &str = "-------------- End ----------------";
/// Snapshot file name inside the checkpoint directory.
pub const SNAPSHOT_FILE: &str = "opt.txt";

/// Renders the sorted `key: value` listing between header and footer.
#[must_use]
pub fn render_listing(options: &Options) -> String {
    let mut text = String::new();
    text.push_str(HEADER);
    text.push('\n');
    for (key, value) in options.entries() {
        text.push_str(key);
        text.push_str(": ");
        text.push_str(&value);
        text.push('\n');
    }
    text.push_str(FOOTER);
    text.push('\n');
    text
}

/// Writes `listing` to `<dir>/opt.txt`, replacing any previous snapshot.
///
/// # Errors
///
/// Returns [`OptionsError::SnapshotWrite`] if the file cannot be written.
pub fn write_snapshot(dir: &Path, listing: &str) -> OptionsResult<()> {
    let path = dir.join(SNAPSHOT_FILE);
    fs::write(&path, listing).map_err(|source| OptionsError::SnapshotWrite {
        path: path.clone(),
        source,
    })?;
    tracing::info!(path = %path.display(), "options snapshot written");
    Ok(())
}

/// Reads a snapshot back into its `key -> value` mapping.
///
/// # Errors
///
/// Returns [`OptionsError::SnapshotRead`] if the file cannot be read and
/// [`OptionsError::MalformedSnapshot`] if it does not follow the listing
/// format.
pub fn read_snapshot(path: &Path) -> OptionsResult<BTreeMap<String, String>> {
    let text = fs::read_to_string(path).map_err(|source| OptionsError::SnapshotRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_listing(&text)
}

/// Parses listing text produced by [`render_listing`].
///
/// # Errors
///
/// Returns [`OptionsError::MalformedSnapshot`] naming the first bad line.
pub fn parse_listing(text: &str) -> OptionsResult<BTreeMap<String, String>> {
    let malformed = |line: usize, content: &str| OptionsError::MalformedSnapshot {
        line,
        content: content.to_string(),
    };

    let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l));
    match lines.next() {
        Some((_, HEADER)) => {}
        Some((n, other)) => return Err(malformed(n, other)),
        None => return Err(malformed(1, "")),
    }

    let mut entries = BTreeMap::new();
    let mut last = 1;
    for (n, line) in lines {
        last = n;
        if line == FOOTER {
            return Ok(entries);
        }
        let (key, value) = line.split_once(": ").ok_or_else(|| malformed(n, line))?;
        entries.insert(key.to_string(), value.to_string());
    }
    Err(malformed(last + 1, ""))
}
