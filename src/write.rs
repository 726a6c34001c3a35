//! Lists every page of a loaded [`Site`] and writes the rendered pages to
//! the output directory of a static build.

use crate::error::AppError;
use crate::site::Site;
use crate::status;
use std::collections::HashSet;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Responsible for rendering every page of a [`Site`] and writing it to disk.
pub struct Writer<'a> {
    /// The loaded site.
    pub site: &'a Site,

    /// The directory in which the HTML files will be written. The project
    /// index lands at `{output_directory}/projects/index.html`, each project
    /// at `{output_directory}/projects/{id}/index.html`, each buzzword's
    /// index at `{output_directory}/tags/{slug}/index.html` and the error
    /// pages at `{output_directory}/error/{code}.html`.
    pub output_directory: &'a Path,
}

impl Writer<'_> {
    /// Takes a single [`Page`], renders it, and writes it to disk.
    fn write_page(&self, page: &Page) -> Result<()> {
        let html = page.render(self.site).map_err(|err| Error::Page {
            path: page.file_path.clone(),
            err,
        })?;
        std::fs::write(&page.file_path, html)?;
        Ok(())
    }

    /// Renders and writes every page. Returns the number of pages written.
    pub fn write_pages(&self) -> Result<usize> {
        let mut seen_dirs: HashSet<PathBuf> = HashSet::new();
        let pages = pages(self.site, self.output_directory);
        for page in &pages {
            let dir = page.file_path.parent().unwrap(); // there should always be a dir
            if seen_dirs.insert(dir.to_owned()) {
                std::fs::create_dir_all(dir)?;
            }
            self.write_page(page)?;
        }
        Ok(pages.len())
    }
}

/// What an output file contains.
#[derive(Debug, PartialEq, Eq)]
enum Source {
    Index,
    Tag(String),
    Project(String),
    Error(axum::http::StatusCode),
}

/// An output HTML file.
#[derive(Debug)]
struct Page {
    source: Source,

    /// The target location on disk for the output file.
    file_path: PathBuf,
}

impl Page {
    fn render(&self, site: &Site) -> std::result::Result<String, AppError> {
        match &self.source {
            Source::Index => site.index_page(None),
            Source::Tag(slug) => site.tag_page(slug),
            Source::Project(id) => site.project_page(id),
            Source::Error(status) => site.error_page(*status),
        }
    }
}

/// Lists every page of the site: the index, one page per project, one
/// pre-filtered index per buzzword and one page per rendered error status.
fn pages(site: &Site, output_directory: &Path) -> Vec<Page> {
    let projects_directory = output_directory.join("projects");
    let mut pages = vec![
        Page {
            source: Source::Index,
            file_path: output_directory.join("index.html"),
        },
        Page {
            source: Source::Index,
            file_path: projects_directory.join("index.html"),
        },
    ];

    pages.extend(site.catalog.all().iter().map(|project| Page {
        source: Source::Project(project.id.clone()),
        file_path: projects_directory.join(&project.id).join("index.html"),
    }));

    // Mirrors `Buzzword::tag_url`.
    pages.extend(site.vocabulary.iter().map(|entry| Page {
        source: Source::Tag(entry.slug.clone()),
        file_path: output_directory
            .join("tags")
            .join(&entry.slug)
            .join("index.html"),
    }));

    pages.extend(status::RENDERED.iter().map(|code| Page {
        source: Source::Error(*code),
        file_path: output_directory
            .join("error")
            .join(format!("{}.html", code.as_u16())),
    }));

    pages
}

/// The result of a fallible page-writing operation.
type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error rendering a page.
    Page { path: PathBuf, err: AppError },

    /// An error writing the output files.
    Io(io::Error),
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Page { path, err } => {
                write!(f, "Rendering '{}': {}", path.display(), err)
            }
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Page { path: _, err } => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}
