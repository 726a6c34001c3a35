//! Resolution of free-text tag queries against the [`Vocabulary`] and
//! filtering of the [`Catalog`] by the resolved tag.

use crate::buzzword::{Buzzword, Vocabulary};
use crate::project::{Catalog, Project};
use std::sync::Arc;

/// The outcome of matching a tag query against the vocabulary. An unknown
/// tag is an ordinary outcome rather than an error.
#[derive(Clone, Debug)]
pub enum Resolution {
    Resolved(Arc<Buzzword>),
    Unknown,
}

impl Resolution {
    pub fn entry(&self) -> Option<&Arc<Buzzword>> {
        match self {
            Resolution::Resolved(entry) => Some(entry),
            Resolution::Unknown => None,
        }
    }
}

/// Resolves `query` to a vocabulary entry. See [`Vocabulary::lookup`] for the
/// matching rules.
pub fn resolve(query: &str, vocabulary: &Vocabulary) -> Resolution {
    match vocabulary.lookup(query) {
        Some(entry) => Resolution::Resolved(entry),
        None => Resolution::Unknown,
    }
}

/// Returns the projects carrying `entry`, in catalog order. A project carries
/// the entry when the name or any alias of one of its tags equals the entry's
/// name, ignoring case.
pub fn filter<'a>(projects: &'a [Project], entry: &Buzzword) -> Vec<&'a Project> {
    let wanted = entry.name.to_lowercase();
    projects
        .iter()
        .filter(|project| {
            project.tags.iter().any(|tag| {
                tag.name.to_lowercase() == wanted
                    || tag.aliases.iter().any(|alias| alias.to_lowercase() == wanted)
            })
        })
        .collect()
}

/// A tag query for a single request: the raw text, how it resolved, and the
/// projects it selects.
#[derive(Debug)]
pub struct TagQuery<'a> {
    pub raw: String,
    pub resolution: Resolution,

    /// The filtered projects when the tag resolved (possibly empty), `None`
    /// when the tag is unknown.
    pub matched_projects: Option<Vec<&'a Project>>,
}

impl<'a> TagQuery<'a> {
    pub fn new(raw: &str, vocabulary: &Vocabulary, catalog: &'a Catalog) -> TagQuery<'a> {
        let resolution = resolve(raw, vocabulary);
        let matched_projects = resolution
            .entry()
            .map(|entry| filter(catalog.all(), entry));
        TagQuery {
            raw: raw.to_owned(),
            resolution,
            matched_projects,
        }
    }
}
