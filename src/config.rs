//! Locates and parses the site configuration: `folio.yaml` at the project
//! root and `theme/theme.yaml` beside it.

use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};

pub const PROJECT_FILE: &str = "folio.yaml";

#[derive(Deserialize)]
struct Project {
    #[serde(default = "default_address")]
    pub address: String,

    #[serde(default = "default_data_directory")]
    pub data_directory: PathBuf,
}

fn default_address() -> String {
    String::from("127.0.0.1:8080")
}

fn default_data_directory() -> PathBuf {
    PathBuf::from("data")
}

#[derive(Deserialize)]
struct Theme {
    index_template: Vec<PathBuf>,
    project_template: Vec<PathBuf>,

    #[serde(default)]
    error_template: Vec<PathBuf>,

    #[serde(default = "default_error_directory")]
    error_directory: PathBuf,

    #[serde(default = "default_static_directory")]
    static_directory: PathBuf,
}

fn default_error_directory() -> PathBuf {
    PathBuf::from("error")
}

fn default_static_directory() -> PathBuf {
    PathBuf::from("static")
}

pub struct Config {
    pub address: String,
    pub projects_file: PathBuf,
    pub buzzwords_file: PathBuf,
    pub data_directory: PathBuf,
    pub descriptions_directory: PathBuf,
    pub index_template: Vec<PathBuf>,
    pub project_template: Vec<PathBuf>,
    pub error_template: Vec<PathBuf>,
    pub error_directory: PathBuf,
    pub static_directory: PathBuf,
}

impl Config {
    /// Searches `dir` and then each of its ancestors for `folio.yaml` and
    /// loads the first one found.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            match Config::from_project_file(&path) {
                Ok(config) => Ok(config),
                Err(e) => Err(anyhow!("Loading configuration: {:?}", e)),
            }
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent),
                None => Err(anyhow!(
                    "Could not find `{}` in any parent directory",
                    PROJECT_FILE
                )),
            }
        }
    }

    pub fn from_project_file(path: &Path) -> Result<Config> {
        let project: Project = serde_yaml::from_reader(open(path, "project")?)?;
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(project_root) => {
                let theme_dir = project_root.join("theme");
                let theme_file = open(&theme_dir.join("theme.yaml"), "theme")?;
                let theme: Theme = serde_yaml::from_reader(theme_file)?;
                let data_directory = project_root.join(&project.data_directory);
                let in_theme = |relpaths: &[PathBuf]| -> Vec<PathBuf> {
                    relpaths
                        .iter()
                        .map(|relpath| theme_dir.join(relpath))
                        .collect()
                };
                Ok(Config {
                    address: project.address,
                    projects_file: data_directory.join("projects.json"),
                    buzzwords_file: data_directory.join("buzzwords.json"),
                    descriptions_directory: data_directory.join("descriptions"),
                    index_template: in_theme(&theme.index_template),
                    project_template: in_theme(&theme.project_template),
                    error_template: in_theme(&theme.error_template),
                    error_directory: theme_dir.join(&theme.error_directory),
                    static_directory: theme_dir.join(&theme.static_directory),
                    data_directory,
                })
            }
        }
    }
}

fn open(path: &Path, kind: &str) -> Result<File> {
    File::open(path).map_err(|e| anyhow!("Opening {} file `{}`: {}", kind, path.display(), e))
}
