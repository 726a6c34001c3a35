//! Defines the [`Buzzword`] and [`Vocabulary`] types. The vocabulary is the
//! dictionary of tags that projects can carry. It is loaded once from a JSON
//! object mapping each key to an optional display name, an optional safe name
//! and an optional list of aliases, and it is normalized at load time so that
//! nothing needs to be re-derived while serving pages.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A single vocabulary entry. Every string that identifies the entry (its
/// key, name, safe name and aliases) resolves back to it via
/// [`Vocabulary::lookup`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Buzzword {
    /// The key under which the entry was declared.
    pub key: String,

    /// The display name. Defaults to `key`.
    pub name: String,

    /// A variant of the name which is safe for URLs and markup. Defaults to
    /// `name`.
    pub safe_name: String,

    /// Alternate spellings. Every alias containing a space is followed by its
    /// hyphenated variant.
    pub aliases: Vec<String>,

    /// The path segment of the entry's tag page, unique within its
    /// [`Vocabulary`]. Derived from `safe_name`.
    pub slug: String,
}

impl Buzzword {
    /// Builds the entry synthesized for a tag that has no definition.
    pub fn minimal(key: &str) -> Buzzword {
        Buzzword {
            key: key.to_owned(),
            name: key.to_owned(),
            safe_name: key.to_owned(),
            aliases: Vec::new(),
            slug: base_slug(key, key),
        }
    }

    fn from_raw(key: &str, raw: RawBuzzword) -> Buzzword {
        let name = raw.name.unwrap_or_else(|| key.to_owned());
        let aliases = match raw.aliases {
            Some(aliases) => with_hyphenated(aliases),
            None => Vec::new(),
        };
        let safe_name = raw.safe_name.unwrap_or_else(|| name.clone());
        Buzzword {
            key: key.to_owned(),
            slug: base_slug(&safe_name, key),
            safe_name,
            name,
            aliases,
        }
    }

    /// The path of the entry's tag page, `/tags/{slug}`.
    pub fn tag_url(&self) -> String {
        format!("/tags/{}", self.slug)
    }

    /// Every string that identifies this entry, in the order they are checked
    /// by the case-insensitive fallback of [`Vocabulary::lookup`].
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.key.as_str())
            .chain(std::iter::once(self.name.as_str()))
            .chain(std::iter::once(self.safe_name.as_str()))
            .chain(self.aliases.iter().map(String::as_str))
    }

    fn is_identified_by(&self, folded: &str) -> bool {
        self.identifiers().any(|id| id.to_lowercase() == folded)
    }
}

// Slugifies the safe name, falling back to the key when nothing of the safe
// name survives.
fn base_slug(safe_name: &str, key: &str) -> String {
    let slug = slug::slugify(safe_name);
    if !slug.is_empty() {
        return slug;
    }
    match slug::slugify(key) {
        slug if slug.is_empty() => "tag".to_owned(),
        slug => slug,
    }
}

// Appends the hyphenated variant of every alias containing a space. Variants
// are only derived from the original aliases.
fn with_hyphenated(aliases: Vec<String>) -> Vec<String> {
    let derived: Vec<String> = aliases
        .iter()
        .filter(|alias| alias.contains(' '))
        .map(|alias| alias.replace(' ', "-"))
        .collect();
    let mut aliases = aliases;
    for variant in derived {
        if !aliases.contains(&variant) {
            aliases.push(variant);
        }
    }
    aliases
}

#[derive(Deserialize)]
struct RawBuzzword {
    #[serde(default)]
    name: Option<String>,

    #[serde(default)]
    aliases: Option<Vec<String>>,

    #[serde(default)]
    safe_name: Option<String>,
}

/// The set of known [`Buzzword`]s, including the ones synthesized for tags
/// that projects declare without a definition. Iteration order is the order
/// of the source file followed by synthesized entries in insertion order.
#[derive(Debug, Default)]
pub struct Vocabulary {
    entries: Vec<Arc<Buzzword>>,
    by_key: HashMap<String, usize>,
    by_slug: HashMap<String, usize>,
}

impl Vocabulary {
    /// Creates an empty vocabulary.
    pub fn new() -> Vocabulary {
        Vocabulary::default()
    }

    /// Builds a vocabulary from the JSON object of buzzword definitions,
    /// applying the defaulting rules to every entry.
    pub fn load(source: serde_json::Map<String, serde_json::Value>) -> Result<Vocabulary> {
        let mut vocabulary = Vocabulary::new();
        for (key, value) in source {
            let raw: RawBuzzword = serde_json::from_value(value)
                .map_err(|err| Error::Entry { key: key.clone(), err })?;
            vocabulary.insert(Buzzword::from_raw(&key, raw));
        }
        Ok(vocabulary)
    }

    /// Parses the JSON object of buzzword definitions from a string.
    pub fn parse(input: &str) -> Result<Vocabulary> {
        Vocabulary::load(serde_json::from_str(input)?)
    }

    /// Reads and parses the buzzword definitions file at `path`.
    pub fn from_file(path: &Path) -> Result<Vocabulary> {
        let contents = std::fs::read_to_string(path).map_err(|err| Error::Read {
            path: path.to_owned(),
            err,
        })?;
        Vocabulary::parse(&contents)
    }

    // Earlier entries keep their slug; a later entry whose slug is taken gets
    // the first free `{slug}-{n}`.
    fn insert(&mut self, mut entry: Buzzword) -> Arc<Buzzword> {
        if self.by_slug.contains_key(&entry.slug) {
            let taken = entry.slug.clone();
            let mut n = 2;
            while self.by_slug.contains_key(&entry.slug) {
                entry.slug = format!("{}-{}", taken, n);
                n += 1;
            }
            tracing::debug!(key = %entry.key, slug = %entry.slug, "buzzword slug taken; renamed");
        }
        let entry = Arc::new(entry);
        self.by_key.insert(entry.key.clone(), self.entries.len());
        self.by_slug.insert(entry.slug.clone(), self.entries.len());
        self.entries.push(Arc::clone(&entry));
        entry
    }

    /// Returns the entry declared under exactly `key`.
    pub fn get(&self, key: &str) -> Option<&Arc<Buzzword>> {
        self.by_key.get(key).map(|&i| &self.entries[i])
    }

    /// Returns the entry whose tag page is `/tags/{slug}`.
    pub fn by_slug(&self, slug: &str) -> Option<&Arc<Buzzword>> {
        self.by_slug.get(slug).map(|&i| &self.entries[i])
    }

    /// Finds the entry identified by `word`. Exact keys are found directly;
    /// anything else falls back to a case-insensitive scan over every entry's
    /// key, name, safe name and aliases in vocabulary order, returning the
    /// first match.
    pub fn lookup(&self, word: &str) -> Option<Arc<Buzzword>> {
        if let Some(entry) = self.get(word) {
            return Some(Arc::clone(entry));
        }
        let folded = word.to_lowercase();
        self.entries
            .iter()
            .find(|entry| entry.is_identified_by(&folded))
            .cloned()
    }

    /// Returns the entry for `key`, inserting a minimal one if the key is
    /// unknown. Calling it again with the same key returns the same entry.
    pub fn ensure(&mut self, key: &str) -> Arc<Buzzword> {
        match self.get(key) {
            Some(entry) => Arc::clone(entry),
            None => {
                tracing::debug!(key, "synthesizing undefined buzzword");
                self.insert(Buzzword::minimal(key))
            }
        }
    }

    /// Iterates over entries in vocabulary order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Buzzword>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The result of a fallible vocabulary-loading operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading a [`Vocabulary`].
#[derive(Debug)]
pub enum Error {
    /// Returned when the definitions file can't be read.
    Read { path: PathBuf, err: std::io::Error },

    /// Returned when the definitions aren't a JSON object.
    DeserializeJson(serde_json::Error),

    /// Returned when a single definition has the wrong shape.
    Entry { key: String, err: serde_json::Error },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Read { path, err } => {
                write!(f, "Reading buzzwords file '{}': {}", path.display(), err)
            }
            Error::DeserializeJson(err) => write!(f, "Parsing buzzwords: {}", err),
            Error::Entry { key, err } => write!(f, "Parsing buzzword `{}`: {}", key, err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Read { path: _, err } => Some(err),
            Error::DeserializeJson(err) => Some(err),
            Error::Entry { key: _, err } => Some(err),
        }
    }
}

impl From<serde_json::Error> for Error {
    /// Converts a [`serde_json::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_json`] deserialization functions.
    fn from(err: serde_json::Error) -> Error {
        Error::DeserializeJson(err)
    }
}
