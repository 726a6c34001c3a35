//! Exports [`Site`], the read-only snapshot of everything loaded at startup,
//! and the page functions the HTTP front end and the static build share.

use crate::buzzword::Vocabulary;
use crate::config::Config;
use crate::context::{ErrorContext, IndexContext, ProjectContext};
use crate::error::AppError;
use crate::project::{Catalog, Loader};
use crate::render::{Renderer, TemplateFiles};
use crate::status;
use anyhow::{Context, Result};
use axum::http::StatusCode;
use std::path::PathBuf;

/// The vocabulary, catalog and templates. Built once before serving and
/// never mutated afterwards.
pub struct Site {
    pub vocabulary: Vocabulary,
    pub catalog: Catalog,
    pub renderer: Renderer,

    /// Served under `/img` and `/css`.
    pub static_directory: PathBuf,
}

impl Site {
    /// Loads the buzzwords, then the projects (which may add buzzwords), then
    /// the templates. Any failure is fatal.
    pub fn load(config: &Config) -> Result<Site> {
        let mut vocabulary = Vocabulary::from_file(&config.buzzwords_file)
            .context("Loading buzzwords")?;
        let defined = vocabulary.len();

        let catalog = Loader::new(&config.data_directory, &config.descriptions_directory)
            .load_file(&config.projects_file, &mut vocabulary)
            .context("Loading projects")?;

        let renderer = Renderer::from_files(&TemplateFiles {
            index: &config.index_template,
            project: &config.project_template,
            error: &config.error_template,
            error_directory: &config.error_directory,
        })
        .context("Loading templates")?;

        tracing::info!(
            projects = catalog.len(),
            buzzwords = vocabulary.len(),
            synthesized = vocabulary.len() - defined,
            "loaded site",
        );

        Ok(Site {
            vocabulary,
            catalog,
            renderer,
            static_directory: config.static_directory.clone(),
        })
    }

    /// Renders the project index, narrowed by `tag` when given.
    pub fn index_page(&self, tag: Option<&str>) -> std::result::Result<String, AppError> {
        let context = IndexContext::build(&self.catalog, &self.vocabulary, tag);
        if let Some(tag) = &context.tag {
            tracing::debug!(
                tag = %tag.name,
                unknown = tag.warn_tag,
                matched = context.projects.len(),
                "tag query",
            );
        }
        Ok(self.renderer.render_index(&context)?)
    }

    /// Renders the index narrowed to the buzzword whose tag page is
    /// `/tags/{slug}`, or fails with 404.
    pub fn tag_page(&self, slug: &str) -> std::result::Result<String, AppError> {
        let entry = self
            .vocabulary
            .by_slug(slug)
            .ok_or(AppError::Status(StatusCode::NOT_FOUND))?;
        self.index_page(Some(&entry.key))
    }

    /// Renders the detail page of project `id`, or fails with 404.
    pub fn project_page(&self, id: &str) -> std::result::Result<String, AppError> {
        let context = ProjectContext::lookup(&self.catalog, id)?;
        Ok(self.renderer.render_project(&context)?)
    }

    /// Renders the error page for `status`. Statuses without a page are
    /// reported as [`AppError::Unexpected`].
    pub fn error_page(&self, status: StatusCode) -> std::result::Result<String, AppError> {
        let status = status::check(status)?;
        Ok(self.renderer.render_error(&ErrorContext { status })?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashMap;
    use std::path::Path;

    fn site(buzzwords: &str, projects: &str) -> Site {
        let mut vocabulary = Vocabulary::parse(buzzwords).unwrap();
        let dir = Path::new("./does-not-exist");
        let catalog = Loader::new(dir, dir)
            .load_str(projects, &mut vocabulary)
            .unwrap();
        let mut errors = HashMap::new();
        for code in status::RENDERED.iter() {
            errors.insert(*code, "error {{.status}}".to_owned());
        }
        let renderer = Renderer::from_sources(
            "{{if .tag}}{{if .tag.warn_tag}}?{{end}}{{if .tag.warn_proj}}!{{end}}{{end}}{{if .info}}<{{.info.key}}>{{end}}{{range .projects}}{{.id}};{{end}}",
            "{{.id}}{{range .buzzwords}} {{.tag_url}}{{end}}",
            &errors,
        )
        .unwrap();
        Site {
            vocabulary,
            catalog,
            renderer,
            static_directory: PathBuf::from("./does-not-exist"),
        }
    }

    fn scenario() -> Site {
        site(
            r#"{"ml": {"aliases": ["Machine Learning"]}, "rust": {}}"#,
            r#"[{"id": "p1", "buzzwords": ["ml"]}, {"id": "p2"}]"#,
        )
    }

    #[test]
    fn test_index_page() -> std::result::Result<(), AppError> {
        let site = scenario();
        assert_eq!("p1;p2;", site.index_page(None)?);
        assert_eq!("<ml>p1;", site.index_page(Some("machine-learning"))?);
        assert_eq!("?p1;p2;", site.index_page(Some("blockchain"))?);
        assert_eq!("!<rust>", site.index_page(Some("rust"))?);
        Ok(())
    }

    #[test]
    fn test_tag_page() -> std::result::Result<(), AppError> {
        let site = scenario();
        assert_eq!("<ml>p1;", site.tag_page("ml")?);
        assert!(matches!(
            site.tag_page("machine-learning"),
            Err(AppError::Status(StatusCode::NOT_FOUND)),
        ));
        Ok(())
    }

    #[test]
    fn test_tag_links_resolve_to_their_buzzword() -> std::result::Result<(), AppError> {
        let site = site(
            r#"{"cpp": {"name": "C++"}, "c": {"name": "C"}}"#,
            r#"[{"id": "p1", "buzzwords": ["cpp"]}, {"id": "p2", "buzzwords": ["c"]}]"#,
        );
        assert_eq!("p1 /tags/c", site.project_page("p1")?);
        assert_eq!("p2 /tags/c-2", site.project_page("p2")?);
        assert_eq!("<cpp>p1;", site.tag_page("c")?);
        assert_eq!("<c>p2;", site.tag_page("c-2")?);
        Ok(())
    }

    #[test]
    fn test_project_page() -> std::result::Result<(), AppError> {
        let site = scenario();
        assert_eq!("p2", site.project_page("p2")?);
        assert!(matches!(
            site.project_page("p3"),
            Err(AppError::Status(StatusCode::NOT_FOUND)),
        ));
        Ok(())
    }

    #[test]
    fn test_error_page() -> std::result::Result<(), AppError> {
        let site = scenario();
        assert_eq!("error 418", site.error_page(StatusCode::IM_A_TEAPOT)?);
        assert!(matches!(
            site.error_page(StatusCode::FORBIDDEN),
            Err(AppError::Unexpected(_)),
        ));
        Ok(())
    }

    #[test]
    fn test_load_rejects_duplicate_ids() {
        let root = tempfile::tempdir().unwrap();
        let data = root.path().join("data");
        std::fs::create_dir(&data).unwrap();
        std::fs::write(data.join("buzzwords.json"), "{}").unwrap();
        std::fs::write(data.join("projects.json"), r#"[{"id": "dup"}, {"id": "dup"}]"#)
            .unwrap();
        let config = Config {
            address: String::new(),
            projects_file: data.join("projects.json"),
            buzzwords_file: data.join("buzzwords.json"),
            descriptions_directory: data.join("descriptions"),
            data_directory: data,
            index_template: Vec::new(),
            project_template: Vec::new(),
            error_template: Vec::new(),
            error_directory: root.path().join("error"),
            static_directory: root.path().join("static"),
        };
        let err = Site::load(&config).err().expect("duplicate ids must fail");
        assert!(format!("{:#}", err).contains("duplicate project id `dup`"));
    }

    #[test]
    fn test_load_sample_site() -> Result<()> {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("site");
        let site = Site::load(&Config::from_directory(&root)?)?;

        // "cuda" is used by a project without being defined.
        assert_eq!(5, site.vocabulary.len());
        assert_eq!(
            Some(vec![
                "A small convolutional network trained from scratch.".to_owned(),
                "Inference runs on the GPU.".to_owned(),
            ]),
            site.catalog.get("digits").unwrap().description_lines,
        );

        let filtered = site.index_page(Some("machine-learning"))?;
        assert!(filtered.contains("Handwritten digit recognition"));
        assert!(!filtered.contains("This website"));

        let unknown = site.index_page(Some("blockchain"))?;
        assert!(unknown.contains("Unknown tag"));
        assert!(unknown.contains("This website"));
        assert!(unknown.contains("Lecture notes"));

        let missing = site.error_page(StatusCode::NOT_FOUND)?;
        assert!(missing.contains("Not Found"));

        let digits = site.project_page("digits")?;
        assert!(digits.contains(r#"href="/tags/ml""#));
        assert!(site.tag_page("ml")?.contains("Handwritten digit recognition"));
        Ok(())
    }

    #[test]
    fn test_sample_site_escapes_tag_query() -> Result<()> {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("site");
        let site = Site::load(&Config::from_directory(&root)?)?;
        let page = site.index_page(Some("<b>x</b>"))?;
        assert!(page.contains("Unknown tag"));
        assert!(!page.contains("<b>x</b>"));
        assert!(page.contains("&lt;b&gt;x&lt;/b&gt;"));
        Ok(())
    }
}
