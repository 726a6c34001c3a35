//! Exports the [`Renderer`], which owns the parsed page templates and renders
//! page contexts into HTML strings.

use crate::context::{ErrorContext, IndexContext, ProjectContext};
use crate::status;
use axum::http::StatusCode;
use gtmpl::{Context, Template, Value};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Holds one parsed template per page kind, plus one per rendered error
/// status.
pub struct Renderer {
    index: Template,
    project: Template,
    errors: HashMap<StatusCode, Template>,
}

/// The template file lists a [`Renderer`] is built from. Each list is
/// concatenated in order before parsing, so shared definitions (a base
/// layout) go first.
pub struct TemplateFiles<'a> {
    pub index: &'a [PathBuf],
    pub project: &'a [PathBuf],

    /// Prepended to every error page template.
    pub error: &'a [PathBuf],

    /// Holds one `{code}.html` per status in [`status::RENDERED`].
    pub error_directory: &'a Path,
}

impl Renderer {
    /// Loads and parses every template. Fails if any file is missing,
    /// including the page for any rendered error status.
    pub fn from_files(files: &TemplateFiles) -> Result<Renderer> {
        let mut errors = HashMap::with_capacity(status::RENDERED.len());
        for code in status::RENDERED.iter() {
            let page = files
                .error_directory
                .join(format!("{}.html", code.as_u16()));
            let paths = files.error.iter().chain(std::iter::once(&page));
            errors.insert(*code, parse_template(&read_templates(paths)?)?);
        }
        Ok(Renderer {
            index: parse_template(&read_templates(files.index.iter())?)?,
            project: parse_template(&read_templates(files.project.iter())?)?,
            errors,
        })
    }

    /// Builds a renderer from template sources held in memory.
    pub fn from_sources(
        index: &str,
        project: &str,
        errors: &HashMap<StatusCode, String>,
    ) -> Result<Renderer> {
        let mut parsed = HashMap::with_capacity(errors.len());
        for (code, source) in errors {
            parsed.insert(*code, parse_template(source)?);
        }
        Ok(Renderer {
            index: parse_template(index)?,
            project: parse_template(project)?,
            errors: parsed,
        })
    }

    pub fn render_index(&self, context: &IndexContext) -> Result<String> {
        execute(&self.index, Value::from(context))
    }

    pub fn render_project(&self, context: &ProjectContext) -> Result<String> {
        execute(&self.project, Value::from(context))
    }

    pub fn render_error(&self, context: &ErrorContext) -> Result<String> {
        match self.errors.get(&context.status) {
            Some(template) => execute(template, Value::from(context)),
            None => Err(Error::NoErrorPage(context.status)),
        }
    }
}

fn execute(template: &Template, value: Value) -> Result<String> {
    let mut out: Vec<u8> = Vec::new();
    template.execute(&mut out, &Context::from(value)?)?;
    String::from_utf8(out).map_err(|e| Error::Execute(e.to_string()))
}

// Loads the template file contents and appends them to one another.
fn read_templates<P: AsRef<Path>>(template_files: impl Iterator<Item = P>) -> Result<String> {
    let mut contents = String::new();
    for template_file in template_files {
        use std::io::Read;
        let template_file = template_file.as_ref();
        File::open(template_file)
            .and_then(|mut file| file.read_to_string(&mut contents))
            .map_err(|e| Error::OpenTemplateFile {
                path: template_file.to_owned(),
                err: e,
            })?;
        contents.push(' ');
    }
    Ok(contents)
}

fn parse_template(contents: &str) -> Result<Template> {
    let mut template = Template::default();
    template.parse(contents).map_err(Error::ParseTemplate)?;
    Ok(template)
}

/// The result of a fallible rendering operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading or executing a template.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O problems while opening template files.
    OpenTemplateFile { path: PathBuf, err: std::io::Error },

    /// Returned for errors parsing template files.
    ParseTemplate(String),

    /// Returned for errors executing a template.
    Execute(String),

    /// Returned when asked to render a status without an error page.
    NoErrorPage(StatusCode),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate(err) => write!(f, "Parsing template: {}", err),
            Error::Execute(err) => write!(f, "Executing template: {}", err),
            Error::NoErrorPage(status) => write!(f, "No error page for status {}", status),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::ParseTemplate(_) => None,
            Error::Execute(_) => None,
            Error::NoErrorPage(_) => None,
        }
    }
}

impl From<String> for Error {
    /// Converts a template error message ([`String`]) into an [`Error`]. This
    /// allows us to use the `?` operator for fallible template operations.
    fn from(err: String) -> Error {
        Error::Execute(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::buzzword::Vocabulary;
    use crate::project::{Catalog, Loader};

    const INDEX: &str = concat!(
        "{{if .tag}}[{{.tag.name}}",
        "{{if .tag.warn_tag}} unknown{{end}}",
        "{{if .tag.warn_proj}} empty{{end}}]{{end}}",
        "{{if .info}}<{{.info.name}}>{{end}}",
        "{{range .projects}}{{.id}};{{end}}",
    );
    const PROJECT: &str = concat!(
        "{{.id}} {{.sub_url}} {{.title}}|",
        "{{range .lines}}{{.}}/{{end}}|",
        "{{if .has_buzzwords}}{{range .buzzwords}}{{.name}},{{end}}{{end}}",
    );

    fn renderer() -> Renderer {
        let mut errors = HashMap::new();
        errors.insert(StatusCode::NOT_FOUND, "gone fishing {{.status}}".to_owned());
        Renderer::from_sources(INDEX, PROJECT, &errors).unwrap()
    }

    fn fixture() -> (Vocabulary, Catalog) {
        let mut vocabulary =
            Vocabulary::parse(r#"{"ml": {"name": "ML", "aliases": ["Machine Learning"]}}"#)
                .unwrap();
        let dir = Path::new("./does-not-exist");
        let catalog = Loader::new(dir, dir)
            .load_str(
                r#"[
                    {"id": "p1", "title": "One", "description": "a\n\nb", "buzzwords": ["ml", "web"]},
                    {"id": "p2", "title": "Two"}
                ]"#,
                &mut vocabulary,
            )
            .unwrap();
        (vocabulary, catalog)
    }

    #[test]
    fn test_render_index() -> Result<()> {
        let (vocabulary, catalog) = fixture();
        let renderer = renderer();

        let all = IndexContext::build(&catalog, &vocabulary, None);
        assert_eq!("p1;p2;", renderer.render_index(&all)?);

        let filtered = IndexContext::build(&catalog, &vocabulary, Some("machine-learning"));
        assert_eq!("[machine-learning]<ML>p1;", renderer.render_index(&filtered)?);

        let unknown = IndexContext::build(&catalog, &vocabulary, Some("blockchain"));
        assert_eq!("[blockchain unknown]p1;p2;", renderer.render_index(&unknown)?);
        Ok(())
    }

    #[test]
    fn test_render_project() -> Result<()> {
        let (_, catalog) = fixture();
        let page = ProjectContext::lookup(&catalog, "p1").unwrap();
        assert_eq!(
            "p1 /projects/p1 One|a/b/|ML,web,",
            renderer().render_project(&page)?,
        );
        Ok(())
    }

    #[test]
    fn test_render_error() -> Result<()> {
        let renderer = renderer();
        let page = renderer.render_error(&ErrorContext {
            status: StatusCode::NOT_FOUND,
        })?;
        assert_eq!("gone fishing 404", page);
        assert!(matches!(
            renderer.render_error(&ErrorContext {
                status: StatusCode::GONE,
            }),
            Err(Error::NoErrorPage(StatusCode::GONE)),
        ));
        Ok(())
    }

    #[test]
    fn test_missing_error_page_fails_loading() {
        let dir = tempfile::tempdir().unwrap();
        let index = dir.path().join("index.html");
        std::fs::write(&index, "{{range .projects}}{{.id}}{{end}}").unwrap();
        let files = vec![index];
        let result = Renderer::from_files(&TemplateFiles {
            index: &files,
            project: &files,
            error: &[],
            error_directory: dir.path(),
        });
        assert!(matches!(result, Err(Error::OpenTemplateFile { .. })));
    }
}
