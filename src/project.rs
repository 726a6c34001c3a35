//! Defines the [`Project`], [`Catalog`], and [`Loader`] types. Also defines
//! the logic for loading project records from their JSON source, resolving
//! each project's description and attaching its resolved [`Buzzword`]s.

use crate::buzzword::{Buzzword, Vocabulary};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DESCRIPTION_EXTENSION: &str = "txt";

/// A single portfolio entry.
#[derive(Clone, Debug)]
pub struct Project {
    /// The unique identifier of the project.
    pub id: String,

    /// The non-empty lines of the project description, if it has one.
    pub description_lines: Option<Vec<String>>,

    /// The project's buzzwords, ordered by their raw keys.
    pub tags: Vec<Arc<Buzzword>>,

    /// Every other field of the source record, passed through to templates.
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Project {
    /// The path of the project's detail page, always `/projects/{id}`.
    pub fn sub_url(&self) -> String {
        sub_url(&self.id)
    }

    pub fn has_tags(&self) -> bool {
        !self.tags.is_empty()
    }
}

/// Builds the detail page path for a project id.
pub fn sub_url(id: &str) -> String {
    format!("/projects/{}", id)
}

#[derive(Deserialize)]
struct RawProject {
    id: String,

    #[serde(default)]
    description: Option<String>,

    #[serde(default)]
    description_file: Option<PathBuf>,

    #[serde(default)]
    buzzwords: Option<Vec<String>>,

    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

/// The loaded projects in source order, indexed by id.
#[derive(Debug, Default)]
pub struct Catalog {
    projects: Vec<Project>,
    by_id: HashMap<String, usize>,
}

impl Catalog {
    /// Builds a catalog from already-resolved projects. Fails if two projects
    /// share an id.
    pub fn new(projects: Vec<Project>) -> Result<Catalog> {
        let mut by_id = HashMap::with_capacity(projects.len());
        for (i, project) in projects.iter().enumerate() {
            if by_id.insert(project.id.clone(), i).is_some() {
                return Err(Error::DuplicateId(project.id.clone()));
            }
        }
        Ok(Catalog { projects, by_id })
    }

    pub fn get(&self, id: &str) -> Option<&Project> {
        self.by_id.get(id).map(|&i| &self.projects[i])
    }

    /// All projects in source order.
    pub fn all(&self) -> &[Project] {
        &self.projects
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

/// Loads [`Project`]s from their JSON source.
pub struct Loader<'a> {
    /// `relative_to` is the directory against which relative
    /// `description_file` paths are resolved (normally the directory holding
    /// the projects file).
    relative_to: &'a Path,

    /// `descriptions_directory` holds the conventional description files,
    /// one `{id}.txt` per project.
    descriptions_directory: &'a Path,
}

impl<'a> Loader<'a> {
    /// Constructs a new loader. See fields on [`Loader`] for argument
    /// descriptions.
    pub fn new(relative_to: &'a Path, descriptions_directory: &'a Path) -> Loader<'a> {
        Loader {
            relative_to,
            descriptions_directory,
        }
    }

    /// Reads the projects file at `path` and loads it into a [`Catalog`],
    /// registering every buzzword the projects declare in `vocabulary`.
    pub fn load_file(&self, path: &Path, vocabulary: &mut Vocabulary) -> Result<Catalog> {
        let contents = std::fs::read_to_string(path).map_err(|err| Error::Read {
            path: path.to_owned(),
            err,
        })?;
        self.load_str(&contents, vocabulary)
    }

    /// Parses a JSON array of project records and loads it into a
    /// [`Catalog`].
    pub fn load_str(&self, input: &str, vocabulary: &mut Vocabulary) -> Result<Catalog> {
        let records: Vec<RawProject> = serde_json::from_str(input)?;
        let mut projects = Vec::with_capacity(records.len());
        for record in records {
            let id = record.id.clone();
            match self.resolve(record, vocabulary) {
                Ok(project) => projects.push(project),
                Err(e) => {
                    return Err(Error::Annotated(
                        format!("loading project `{}`", id),
                        Box::new(e),
                    ))
                }
            }
        }
        Catalog::new(projects)
    }

    fn resolve(&self, record: RawProject, vocabulary: &mut Vocabulary) -> Result<Project> {
        let description = self.description(&record)?;

        let mut keys = record.buzzwords.unwrap_or_default();
        keys.sort();
        keys.dedup();

        Ok(Project {
            description_lines: description.as_deref().map(split_lines),
            tags: keys.iter().map(|key| vocabulary.ensure(key)).collect(),
            id: record.id,
            extra: record.extra,
        })
    }

    // Resolves the description text: inline field first, then the explicit
    // file, then the conventional per-id file. Only a missing conventional
    // file is tolerated.
    fn description(&self, record: &RawProject) -> Result<Option<String>> {
        if let Some(text) = &record.description {
            return Ok(Some(text.clone()));
        }
        if let Some(file) = &record.description_file {
            let path = self.relative_to.join(file);
            return match std::fs::read_to_string(&path) {
                Ok(text) => Ok(Some(text)),
                Err(err) => Err(Error::Read { path, err }),
            };
        }
        let path = self
            .descriptions_directory
            .join(format!("{}.{}", record.id, DESCRIPTION_EXTENSION));
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(err) => match err.kind() {
                std::io::ErrorKind::NotFound => Ok(None),
                _ => Err(Error::Read { path, err }),
            },
        }
    }
}

/// Splits a description into its lines, dropping empty ones.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Represents the result of a [`Catalog`]-load operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading the [`Catalog`].
#[derive(Debug)]
pub enum Error {
    /// Returned when two projects declare the same id.
    DuplicateId(String),

    /// Returned when the projects file or a description file can't be read.
    Read { path: PathBuf, err: std::io::Error },

    /// Returned when the projects file isn't a JSON array of records.
    DeserializeJson(serde_json::Error),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::DuplicateId(id) => write!(f, "duplicate project id `{}`", id),
            Error::Read { path, err } => {
                write!(f, "Reading '{}': {}", path.display(), err)
            }
            Error::DeserializeJson(err) => err.fmt(f),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::DuplicateId(_) => None,
            Error::Read { path: _, err } => Some(err),
            Error::DeserializeJson(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
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

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    fn load(input: &str, vocabulary: &mut Vocabulary) -> Result<Catalog> {
        let dir = Path::new("./does-not-exist");
        Loader::new(dir, dir).load_str(input, vocabulary)
    }

    #[test]
    fn test_sub_url() -> Result<()> {
        let mut vocabulary = Vocabulary::new();
        let catalog = load(r#"[{"id": "p1"}, {"id": "other-thing"}]"#, &mut vocabulary)?;
        for project in catalog.all() {
            assert_eq!(format!("/projects/{}", project.id), project.sub_url());
        }
        Ok(())
    }

    #[test]
    fn test_source_order_and_index() -> Result<()> {
        let mut vocabulary = Vocabulary::new();
        let catalog = load(r#"[{"id": "b"}, {"id": "a"}, {"id": "c"}]"#, &mut vocabulary)?;
        let ids: Vec<&str> = catalog.all().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(vec!["b", "a", "c"], ids);
        assert_eq!("a", catalog.get("a").unwrap().id);
        assert!(catalog.get("d").is_none());
        Ok(())
    }

    #[test]
    fn test_duplicate_id() {
        let mut vocabulary = Vocabulary::new();
        match load(r#"[{"id": "dup"}, {"id": "dup"}]"#, &mut vocabulary) {
            Err(Error::DuplicateId(id)) => assert_eq!("dup", id),
            other => panic!("expected duplicate id, got {:?}", other),
        }
    }

    #[test]
    fn test_inline_description_lines() -> Result<()> {
        let mut vocabulary = Vocabulary::new();
        let catalog = load(
            r#"[{"id": "p1", "description": "first\n\nsecond\n"}]"#,
            &mut vocabulary,
        )?;
        assert_eq!(
            Some(vec!["first".to_owned(), "second".to_owned()]),
            catalog.get("p1").unwrap().description_lines,
        );
        Ok(())
    }

    #[test]
    fn test_description_fallbacks() -> Result<()> {
        let root = tempfile::tempdir().unwrap();
        let descriptions = root.path().join("descriptions");
        fs::create_dir(&descriptions).unwrap();
        fs::write(root.path().join("explicit.txt"), "from field\n").unwrap();
        fs::write(descriptions.join("conventional.txt"), "by convention").unwrap();
        fs::write(descriptions.join("inline.txt"), "ignored").unwrap();
        fs::write(descriptions.join("explicit.txt"), "also ignored").unwrap();

        let mut vocabulary = Vocabulary::new();
        let catalog = Loader::new(root.path(), &descriptions).load_str(
            r#"[
                {"id": "inline", "description": "inline text"},
                {"id": "explicit", "description_file": "explicit.txt"},
                {"id": "conventional"},
                {"id": "absent"}
            ]"#,
            &mut vocabulary,
        )?;

        let lines = |id: &str| catalog.get(id).unwrap().description_lines.clone();
        assert_eq!(Some(vec!["inline text".to_owned()]), lines("inline"));
        assert_eq!(Some(vec!["from field".to_owned()]), lines("explicit"));
        assert_eq!(Some(vec!["by convention".to_owned()]), lines("conventional"));
        assert_eq!(None, lines("absent"));
        Ok(())
    }

    #[test]
    fn test_missing_explicit_description_file() {
        let root = tempfile::tempdir().unwrap();
        let mut vocabulary = Vocabulary::new();
        let result = Loader::new(root.path(), root.path()).load_str(
            r#"[{"id": "p1", "description_file": "missing.txt"}]"#,
            &mut vocabulary,
        );
        match result {
            Err(Error::Annotated(_, err)) => assert!(matches!(*err, Error::Read { .. })),
            other => panic!("expected read error, got {:?}", other),
        }
    }

    #[test]
    fn test_tags_sorted_and_resolved() -> Result<()> {
        let mut vocabulary =
            Vocabulary::parse(r#"{"rust": {"name": "Rust"}, "ml": {}}"#).unwrap();
        let catalog = load(
            r#"[{"id": "p1", "buzzwords": ["rust", "Zig", "ml", "rust"]}, {"id": "p2"}]"#,
            &mut vocabulary,
        )?;

        let p1 = catalog.get("p1").unwrap();
        let keys: Vec<&str> = p1.tags.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(vec!["Zig", "ml", "rust"], keys);
        assert_eq!("Rust", p1.tags[2].name);
        assert!(p1.has_tags());
        assert!(Arc::ptr_eq(&p1.tags[0], vocabulary.get("Zig").unwrap()));

        assert!(!catalog.get("p2").unwrap().has_tags());
        Ok(())
    }

    #[test]
    fn test_null_buzzwords() -> Result<()> {
        let mut vocabulary = Vocabulary::new();
        let catalog = load(r#"[{"id": "p1", "buzzwords": null}]"#, &mut vocabulary)?;
        assert!(!catalog.get("p1").unwrap().has_tags());
        assert!(vocabulary.is_empty());
        Ok(())
    }

    #[test]
    fn test_extra_fields_preserved() -> Result<()> {
        let mut vocabulary = Vocabulary::new();
        let catalog = load(
            r#"[{"id": "p1", "title": "Thing", "year": 2021}]"#,
            &mut vocabulary,
        )?;
        let extra = &catalog.get("p1").unwrap().extra;
        assert_eq!(Some(&serde_json::json!("Thing")), extra.get("title"));
        assert_eq!(Some(&serde_json::json!(2021)), extra.get("year"));
        assert!(extra.get("id").is_none());
        Ok(())
    }
}
