//! Defines the crate-level [`Error`] type returned by
//! [`crate::generate::Generator::generate`]. Every error aborts the run; each
//! variant carries the path it was working on.

use std::io;
use std::path::{Path, PathBuf};

use crate::{config, metadata, publish, render};

/// The result of a fallible generation step.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for generating a site.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned for missing directories or invalid configuration.
    #[error(transparent)]
    Config(#[from] config::Error),

    /// Returned when creating, removing, copying, reading or writing a file or
    /// directory fails.
    #[error("{action} `{}`: {err}", path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        err: io::Error,
    },

    /// Returned when a post's frontmatter can't be extracted, or is missing a
    /// field the index listing needs.
    #[error("reading metadata of `{}`: {err}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        err: metadata::Error,
    },

    /// Returned for template, Markdown and link-rewriting failures.
    #[error("rendering `{}`: {err}", path.display())]
    Render {
        path: PathBuf,
        #[source]
        err: render::Error,
    },

    /// Returned when the publish collaborator fails. The local site is
    /// complete when this is returned.
    #[error("publishing `{}`: {err}", path.display())]
    Publish {
        path: PathBuf,
        #[source]
        err: publish::Error,
    },
}

impl Error {
    pub(crate) fn fs<'a>(action: &'static str, path: &'a Path) -> impl FnOnce(io::Error) -> Error + 'a {
        move |err| Error::Filesystem {
            action,
            path: path.to_owned(),
            err,
        }
    }

    pub(crate) fn metadata<'a>(path: &'a Path) -> impl FnOnce(metadata::Error) -> Error + 'a {
        move |err| Error::Metadata {
            path: path.to_owned(),
            err,
        }
    }

    /// Frontmatter failures surfaced by the renderer are reported as
    /// [`Error::Metadata`].
    pub(crate) fn render<'a>(path: &'a Path) -> impl FnOnce(render::Error) -> Error + 'a {
        move |err| match err {
            render::Error::Metadata(err) => Error::Metadata {
                path: path.to_owned(),
                err,
            },
            err => Error::Render {
                path: path.to_owned(),
                err,
            },
        }
    }
}
