//! Builds the typed contexts handed to the templates: the project index
//! (optionally narrowed by a tag query), a single project page and the error
//! pages. See [`crate::value`] for how contexts become template values.

use crate::buzzword::{Buzzword, Vocabulary};
use crate::project::{Catalog, Project};
use crate::tag::{Resolution, TagQuery};
use axum::http::StatusCode;
use std::sync::Arc;

/// Describes the tag query echoed back on the index page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagBanner {
    /// The query as the visitor typed it.
    pub name: String,

    /// Set when the query didn't match any buzzword.
    pub warn_tag: bool,

    /// Set when the query matched a buzzword that no project carries.
    pub warn_proj: bool,
}

/// Context for the project index page.
#[derive(Debug)]
pub struct IndexContext<'a> {
    pub tag: Option<TagBanner>,
    pub info: Option<Arc<Buzzword>>,
    pub projects: Vec<&'a Project>,
}

impl<'a> IndexContext<'a> {
    /// The unfiltered index.
    pub fn all(catalog: &'a Catalog) -> IndexContext<'a> {
        IndexContext {
            tag: None,
            info: None,
            projects: catalog.all().iter().collect(),
        }
    }

    /// The index for an optional `tag` query. Blank queries are treated as
    /// no query at all.
    pub fn build(
        catalog: &'a Catalog,
        vocabulary: &Vocabulary,
        tag: Option<&str>,
    ) -> IndexContext<'a> {
        match tag.filter(|tag| !tag.trim().is_empty()) {
            Some(tag) => IndexContext::for_query(TagQuery::new(tag, vocabulary, catalog), catalog),
            None => IndexContext::all(catalog),
        }
    }

    /// The index narrowed by a tag query. An unknown tag shows every project
    /// with `warn_tag`; a known tag without projects shows none with
    /// `warn_proj`.
    pub fn for_query(query: TagQuery<'a>, catalog: &'a Catalog) -> IndexContext<'a> {
        let mut banner = TagBanner {
            name: query.raw,
            warn_tag: false,
            warn_proj: false,
        };
        match (query.resolution, query.matched_projects) {
            (Resolution::Resolved(entry), Some(projects)) => {
                banner.warn_proj = projects.is_empty();
                IndexContext {
                    tag: Some(banner),
                    info: Some(entry),
                    projects,
                }
            }
            _ => {
                banner.warn_tag = true;
                IndexContext {
                    tag: Some(banner),
                    info: None,
                    projects: catalog.all().iter().collect(),
                }
            }
        }
    }
}

/// Context for a project detail page.
#[derive(Debug)]
pub struct ProjectContext<'a>(pub &'a Project);

impl<'a> ProjectContext<'a> {
    /// Looks up the project with `id`. A miss is always a 404.
    pub fn lookup(catalog: &'a Catalog, id: &str) -> Result<ProjectContext<'a>, StatusCode> {
        catalog
            .get(id)
            .map(ProjectContext)
            .ok_or(StatusCode::NOT_FOUND)
    }
}

/// Context for an error page.
#[derive(Debug, Clone, Copy)]
pub struct ErrorContext {
    pub status: StatusCode,
}
