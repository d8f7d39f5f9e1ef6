//! Loads a [`Config`] from a `vellum.yaml` project file. Relative paths in the
//! project file are resolved against the directory containing it.

use serde::Deserialize;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use url::Url;

/// The name of the project file searched for by [`Config::from_directory`].
pub const PROJECT_FILE: &str = "vellum.yaml";

static DEFAULT_GATEWAY: LazyLock<Url> = LazyLock::new(|| Url::parse("https://ipfs.io/ipfs/").unwrap());

#[derive(Deserialize)]
struct Project {
    title: String,
    description: String,
    author: String,

    #[serde(default = "Project::default_source_directory")]
    source_directory: PathBuf,

    /// Defaults to `{source_directory}/posts`.
    #[serde(default)]
    posts_directory: Option<PathBuf>,

    #[serde(default = "Project::default_public_directory")]
    public_directory: PathBuf,

    #[serde(default = "Project::default_theme_directory")]
    theme_directory: PathBuf,

    #[serde(default)]
    theme: Theme,

    #[serde(default)]
    publish: Publish,
}

impl Project {
    fn default_source_directory() -> PathBuf {
        PathBuf::from("source")
    }

    fn default_public_directory() -> PathBuf {
        PathBuf::from("public")
    }

    fn default_theme_directory() -> PathBuf {
        PathBuf::from("theme")
    }
}

/// The theme files, relative to the theme directory.
#[derive(Deserialize)]
#[serde(default)]
struct Theme {
    post_template: PathBuf,
    index_template: PathBuf,
    assets: PathBuf,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            post_template: PathBuf::from("post2.hbs"),
            index_template: PathBuf::from("index.hbs"),
            assets: PathBuf::from("assets"),
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct Publish {
    enabled: bool,
    store: PathBuf,
    gateway: Url,
}

impl Default for Publish {
    fn default() -> Self {
        Publish {
            enabled: true,
            store: PathBuf::from(".vellum/store"),
            gateway: DEFAULT_GATEWAY.clone(),
        }
    }
}

/// The blog-level settings shown by the theme.
#[derive(Clone, Debug)]
pub struct Blog {
    pub title: String,
    pub description: String,
    pub author: String,
}

/// Where and how to publish the index page.
#[derive(Clone, Debug)]
pub struct PublishConfig {
    /// The directory of the local content store.
    pub store: PathBuf,

    /// The base URL content identifiers are appended to when reported.
    pub gateway: Url,
}

/// The settings for one generation run.
#[derive(Clone, Debug)]
pub struct Config {
    pub blog: Blog,
    pub source_directory: PathBuf,
    pub posts_directory: PathBuf,
    pub public_directory: PathBuf,
    pub theme_directory: PathBuf,
    pub post_template: PathBuf,
    pub index_template: PathBuf,
    pub assets_directory: PathBuf,

    /// `None` when publishing is disabled.
    pub publish: Option<PublishConfig>,
}

impl Config {
    /// Searches `dir` and its ancestors for a `vellum.yaml` project file and
    /// loads the first one found.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.is_file() {
            Config::from_project_file(&path)
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent),
                None => Err(Error::NotFound),
            }
        }
    }

    /// Loads the project file at `path`.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let file = File::open(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        let project: Project = serde_yaml::from_reader(file).map_err(|err| Error::Parse {
            path: path.to_owned(),
            err,
        })?;
        let project_root = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(Config::from_project(project, project_root))
    }

    fn from_project(project: Project, project_root: &Path) -> Config {
        let source_directory = project_root.join(&project.source_directory);
        let theme_directory = project_root.join(&project.theme_directory);
        Config {
            blog: Blog {
                title: project.title,
                description: project.description,
                author: project.author,
            },
            posts_directory: match &project.posts_directory {
                Some(dir) => project_root.join(dir),
                None => source_directory.join("posts"),
            },
            source_directory,
            public_directory: project_root.join(&project.public_directory),
            post_template: theme_directory.join(&project.theme.post_template),
            index_template: theme_directory.join(&project.theme.index_template),
            assets_directory: theme_directory.join(&project.theme.assets),
            theme_directory,
            publish: match project.publish.enabled {
                true => Some(PublishConfig {
                    store: project_root.join(&project.publish.store),
                    gateway: project.publish.gateway,
                }),
                false => None,
            },
        }
    }
}

/// The result of loading or validating configuration.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a configuration error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when no project file exists in the directory or its
    /// ancestors.
    #[error("could not find `vellum.yaml` in any parent directory")]
    NotFound,

    /// Returned when the project file can't be opened.
    #[error("opening project file `{}`: {err}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        err: io::Error,
    },

    /// Returned when the project file is not valid YAML or is missing
    /// required keys.
    #[error("loading project file `{}`: {err}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        err: serde_yaml::Error,
    },

    /// Returned when the source directory does not exist.
    #[error("source directory `{}` doesn't exist", .0.display())]
    MissingSourceDirectory(PathBuf),
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    #[test]
    fn test_from_project_file_defaults() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PROJECT_FILE);
        fs::write(&path, "title: Notes\ndescription: A blog\nauthor: Ada\n").unwrap();

        let config = Config::from_project_file(&path)?;
        assert_eq!("Notes", config.blog.title);
        assert_eq!(dir.path().join("source"), config.source_directory);
        assert_eq!(dir.path().join("source/posts"), config.posts_directory);
        assert_eq!(dir.path().join("public"), config.public_directory);
        assert_eq!(dir.path().join("theme/post2.hbs"), config.post_template);
        assert_eq!(dir.path().join("theme/index.hbs"), config.index_template);
        assert_eq!(dir.path().join("theme/assets"), config.assets_directory);

        let publish = config.publish.unwrap();
        assert_eq!(dir.path().join(".vellum/store"), publish.store);
        assert_eq!("https://ipfs.io/ipfs/", publish.gateway.as_str());
        Ok(())
    }

    #[test]
    fn test_from_project_file_overrides() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PROJECT_FILE);
        fs::write(
            &path,
            concat!(
                "title: Notes\ndescription: A blog\nauthor: Ada\n",
                "source_directory: src\nposts_directory: drafts\n",
                "theme_directory: themes/plain\ntheme:\n  post_template: post.tmpl\n",
                "publish:\n  enabled: false\n",
            ),
        )
        .unwrap();

        let config = Config::from_project_file(&path)?;
        assert_eq!(dir.path().join("src"), config.source_directory);
        assert_eq!(dir.path().join("drafts"), config.posts_directory);
        assert_eq!(dir.path().join("themes/plain/post.tmpl"), config.post_template);
        assert_eq!(dir.path().join("themes/plain/index.hbs"), config.index_template);
        assert!(config.publish.is_none());
        Ok(())
    }

    #[test]
    fn test_missing_required_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PROJECT_FILE);
        fs::write(&path, "title: Notes\n").unwrap();
        assert!(matches!(
            Config::from_project_file(&path),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn test_from_directory_searches_ancestors() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(PROJECT_FILE),
            "title: Notes\ndescription: A blog\nauthor: Ada\n",
        )
        .unwrap();
        let nested = dir.path().join("source/posts");
        fs::create_dir_all(&nested).unwrap();

        let config = Config::from_directory(&nested)?;
        assert_eq!(dir.path().join("public"), config.public_directory);
        Ok(())
    }
}
