//! Channel and value aliases from `~/.uDMXrc`
//!
//! Each non-comment line of the alias file reads `<class> <name> <text>`,
//! where class is `channel` or `values`:
//!
//! ```text
//! # stage left
//! channel front 7
//! values blackout 0 0 0
//! ```
//!
//! A lookup builds the key `"<class> <name> "` and returns whatever follows
//! the first case-insensitive occurrence of that key. The trailing space keeps
//! `red` from matching a `reddish` line.

use std::fmt;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// File name of the alias file inside the home directory
pub const ALIAS_FILE_NAME: &str = ".uDMXrc";

/// Keyword class of an alias line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasClass {
    /// Resolves to a single channel number
    Channel,
    /// Resolves to a whitespace-separated list of values
    Values,
}

impl AliasClass {
    pub fn as_str(self) -> &'static str {
        match self {
            AliasClass::Channel => "channel",
            AliasClass::Values => "values",
        }
    }
}

impl fmt::Display for AliasClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything that can resolve an alias name to its text
pub trait AliasSource {
    fn resolve(&self, class: AliasClass, name: &str) -> Option<String>;
}

/// In-memory alias text, one entry per line
impl AliasSource for str {
    fn resolve(&self, class: AliasClass, name: &str) -> Option<String> {
        find_alias(self, class, name).map(str::to_owned)
    }
}

/// Alias source with no entries
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAliases;

impl AliasSource for NoAliases {
    fn resolve(&self, _class: AliasClass, _name: &str) -> Option<String> {
        None
    }
}

/// Alias file on disk
///
/// The file is re-read on every lookup. A missing or unreadable file
/// resolves nothing.
#[derive(Debug, Clone)]
pub struct AliasFile {
    path: PathBuf,
}

impl AliasFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl AliasSource for AliasFile {
    fn resolve(&self, class: AliasClass, name: &str) -> Option<String> {
        // Stray non-UTF-8 bytes must not hide the remaining lines
        let contents = match fs::read(&self.path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                debug!("Opening {} failed: {}", self.path.display(), e);
                return None;
            }
        };

        let found = find_alias(&contents, class, name).map(str::to_owned);
        if let Some(text) = &found {
            debug!("Alias '{} {}' resolved to '{}'", class, name, text);
        }
        found
    }
}

/// Default alias file location
pub fn default_alias_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(ALIAS_FILE_NAME))
}

/// Find the text following `"<class> <name> "` in alias file contents
///
/// Lines starting with `#` are skipped. The first matching line wins and the
/// key may occur anywhere in it. Matching ignores ASCII case.
pub fn find_alias<'a>(contents: &'a str, class: AliasClass, name: &str) -> Option<&'a str> {
    let key = format!("{} {} ", class, name).to_ascii_lowercase();

    contents
        .lines()
        .filter(|line| !line.starts_with('#'))
        .find_map(|line| {
            // ASCII lowercasing keeps byte offsets, so `pos` indexes `line` too
            let pos = line.to_ascii_lowercase().find(&key)?;
            Some(&line[pos + key.len()..])
        })
}
