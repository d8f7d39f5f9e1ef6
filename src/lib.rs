//! The library code for the `vellum` static blog generator. A run turns a
//! directory of Markdown posts into a static site in four steps:
//!
//! 1. Clearing the output directory and copying the theme assets into it
//!    ([`crate::generate`])
//! 2. Rendering each post with the theme's post template
//!    ([`crate::render`]) and writing it to a directory derived from its date
//!    and title ([`crate::path`])
//! 3. Rendering the index page, which lists every post, from the posts'
//!    frontmatter ([`crate::metadata`])
//! 4. Publishing the index page to a content-addressed store
//!    ([`crate::publish`])
//!
//! Every page has its relative links rewritten to be root-relative
//! ([`crate::links`]) before it is written, so pages link the same way no
//! matter how deeply they are nested.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod config;
pub mod error;
pub mod generate;
pub mod links;
pub mod markdown;
pub mod metadata;
pub mod path;
pub mod post;
pub mod publish;
pub mod render;
mod value;

pub use error::{Error, Result};
