//! Exports the [`build_site`] function which writes a loaded [`Site`] out as
//! static files: every page ([`crate::write`]) plus a copy of the theme's
//! static assets.

use crate::site::Site;
use crate::write::{Error as WriteError, Writer};
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Output subdirectories owned by the build. Only these are cleaned, never
/// the whole output directory.
const OWNED_DIRECTORIES: [&str; 5] = ["projects", "tags", "error", "img", "css"];

/// Builds the static site for `site` into `output_directory`. Returns the
/// number of pages written.
pub fn build_site(site: &Site, output_directory: &Path) -> Result<usize> {
    // Blow away the old output so pages for removed projects or buzzwords
    // don't linger.
    for dir in OWNED_DIRECTORIES.iter() {
        rmdir(&output_directory.join(dir))?;
    }

    let written = Writer {
        site,
        output_directory,
    }
    .write_pages()?;

    if site.static_directory.is_dir() {
        copy_dir(&site.static_directory, output_directory)?;
    } else {
        tracing::warn!(
            directory = %site.static_directory.display(),
            "static directory missing; no assets copied",
        );
    }

    Ok(written)
}

fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    for result in WalkDir::new(src).min_depth(1) {
        let entry = result?;
        // strip_prefix shouldn't fail since `src` is always an ancestor of
        // `entry.path()`
        let target = dst.join(entry.path().strip_prefix(src).unwrap());
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during writing, cleaning
/// output directories, walking the static directory, and other I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors writing pages to disk.
    Write(WriteError),

    /// Returned for I/O problems while cleaning output directories.
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned for errors walking the static directory.
    WalkDir(walkdir::Error),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Write(err) => err.fmt(f),
            Error::Clean { path, err } => {
                write!(f, "Cleaning directory '{}': {}", path.display(), err)
            }
            Error::WalkDir(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Write(err) => Some(err),
            Error::Clean { path: _, err } => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts [`walkdir::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

fn rmdir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}
