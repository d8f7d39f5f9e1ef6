//! Exports [`Generator`], which stitches together the high-level steps of
//! building the site: validating the source directory, clearing the output
//! directory, copying the theme assets, rendering every post
//! ([`crate::render`], [`crate::path`], [`crate::links`]), rendering the index
//! page and publishing it ([`crate::publish`]).
//!
//! Every run is a full rebuild and every error aborts it. Files written before
//! the failing step are left on disk.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use url::Url;
use walkdir::WalkDir;

use crate::config::{self, Config};
use crate::error::{Error, Result};
use crate::links;
use crate::metadata::{self, Metadata};
use crate::path::{ensure_dir, OutputPath, PathResolver, INDEX_FILE, POSTS_DIRECTORY};
use crate::post::{list_posts, Post};
use crate::publish::{publish_index, Published, Publisher};
use crate::render::{ArticleSummary, IndexContext, PostContext, SiteRenderer};

/// What a successful run produced.
#[derive(Debug, Default)]
pub struct Report {
    /// The number of post pages written.
    pub posts: usize,

    /// The index page, if the site has a posts directory.
    pub index: Option<PathBuf>,

    /// The published index page, if a [`Publisher`] was configured.
    pub published: Option<Published>,
}

/// Generates a site from a [`Config`].
pub struct Generator<'a> {
    config: &'a Config,
    resolver: PathResolver,
    publisher: Option<(&'a dyn Publisher, Url)>,
}

impl<'a> Generator<'a> {
    pub fn new(config: &'a Config, resolver: PathResolver) -> Generator<'a> {
        Generator {
            config,
            resolver,
            publisher: None,
        }
    }

    /// Publishes the index page with `publisher` once it is written, reporting
    /// it under `gateway`.
    pub fn with_publisher(mut self, publisher: &'a dyn Publisher, gateway: Url) -> Generator<'a> {
        self.publisher = Some((publisher, gateway));
        self
    }

    /// Runs the whole pipeline.
    pub fn generate(&mut self) -> Result<Report> {
        let config = self.config;
        let public = config.public_directory.as_path();

        if !config.source_directory.is_dir() {
            return Err(config::Error::MissingSourceDirectory(config.source_directory.clone()).into());
        }

        info!("clearing {}", public.display());
        rmdir(public)?;
        fs::create_dir_all(public).map_err(Error::fs("creating directory", public))?;

        copy_assets(&config.assets_directory, public)?;

        if !config.posts_directory.is_dir() {
            info!(
                "no posts directory at {}, nothing to render",
                config.posts_directory.display()
            );
            return Ok(Report::default());
        }

        ensure_dir(&public.join(POSTS_DIRECTORY))?;
        let file_names = list_posts(&config.posts_directory)?;
        info!("found {} posts in {}", file_names.len(), config.posts_directory.display());

        let renderer = SiteRenderer::load(&config.post_template, &config.index_template)?;
        let slugs = self.render_posts(&renderer, &file_names)?;
        let index = self.render_index(&renderer, &file_names, &slugs)?;

        let published = match &self.publisher {
            Some((publisher, gateway)) => Some(
                publish_index(*publisher, &index, gateway).map_err(|err| Error::Publish {
                    path: index.clone(),
                    err,
                })?,
            ),
            None => None,
        };

        Ok(Report {
            posts: file_names.len(),
            index: Some(index),
            published,
        })
    }

    /// Renders and writes every post, returning the slug each post was
    /// written under, keyed by file name.
    fn render_posts(
        &mut self,
        renderer: &SiteRenderer,
        file_names: &[String],
    ) -> Result<HashMap<String, String>> {
        let config = self.config;
        let public = config.public_directory.as_path();
        let context = PostContext {
            blog_title: config.blog.title.clone(),
            blog_description: config.blog.description.clone(),
            blog_author: config.blog.author.clone(),
            articles_count: file_names.len(),
        };

        let mut slugs = HashMap::with_capacity(file_names.len());
        for file_name in file_names {
            let post = Post::read(&config.posts_directory, file_name)?;
            let (metadata, html) = renderer
                .render_post(&post.source, &context)
                .map_err(Error::render(&post.path))?;

            let output = self.resolver.resolve(&metadata);
            let file = self.resolver.scaffold(public, &output)?;
            let html = rewrite_links(&html, public, &post.path)?;

            if file.exists() {
                warn!("{} overwrites {}", post.file_name, file.display());
            }
            fs::write(&file, html).map_err(Error::fs("writing page", &file))?;
            debug!("{} -> {}", post.file_name, file.display());

            slugs.insert(post.file_name, output.slug);
        }
        Ok(slugs)
    }

    /// Builds the index listing from each post's frontmatter, then renders,
    /// writes and returns the path of the index page.
    fn render_index(
        &self,
        renderer: &SiteRenderer,
        file_names: &[String],
        slugs: &HashMap<String, String>,
    ) -> Result<PathBuf> {
        let config = self.config;
        let public = config.public_directory.as_path();

        let mut articles = Vec::with_capacity(file_names.len());
        for file_name in file_names {
            let post = Post::read(&config.posts_directory, file_name)?;
            let metadata = metadata::extract(&post.source).map_err(Error::metadata(&post.path))?;
            let summary = summarize(&metadata, slugs.get(file_name).map(String::as_str))
                .map_err(Error::metadata(&post.path))?;
            articles.push(summary);
        }

        let context = IndexContext {
            title: config.blog.title.clone(),
            description: config.blog.description.clone(),
            author: config.blog.author.clone(),
            articles,
        };
        let html = renderer
            .render_index(&context)
            .map_err(Error::render(&config.index_template))?;
        let html = rewrite_links(&html, public, &config.index_template)?;

        let index = public.join(INDEX_FILE);
        fs::write(&index, html).map_err(Error::fs("writing page", &index))?;
        info!("wrote {} with {} articles", index.display(), context.articles.len());
        Ok(index)
    }
}

/// Builds the index entry for a post. Unlike post pages, the index can't fall
/// back to today's date, so a missing or malformed `date` is an error. A post
/// without a title is listed under the slug it was written with.
fn summarize(metadata: &Metadata, written_slug: Option<&str>) -> metadata::Result<ArticleSummary> {
    let (date, parts) = match (&metadata.date, metadata.date_parts()) {
        (Some(date), Some(parts)) => (date, parts),
        (Some(date), None) => return Err(metadata::Error::MalformedDate(date.clone())),
        (None, _) => return Err(metadata::Error::MissingField("date")),
    };
    let slug = metadata
        .slug()
        .or_else(|| written_slug.map(str::to_owned))
        .ok_or(metadata::Error::MissingField("title"))?;
    let output = OutputPath {
        year: parts.year.to_owned(),
        month: parts.month.to_owned(),
        day: parts.day.to_owned(),
        slug,
    };
    Ok(ArticleSummary {
        date: date.clone(),
        title: metadata.title.clone(),
        abstract_: metadata.abstract_.clone(),
        url: output.url(),
    })
}

fn rewrite_links(html: &str, public: &Path, source: &Path) -> Result<String> {
    links::rewrite(html, public).map_err(|err| Error::render(source)(err.into()))
}

/// Copies the theme assets into the output root. The assets directory must
/// exist.
fn copy_assets(src: &Path, dst: &Path) -> Result<()> {
    if !src.is_dir() {
        return Err(Error::fs("copying assets", src)(io::Error::new(
            io::ErrorKind::NotFound,
            "theme has no assets directory",
        )));
    }
    for result in WalkDir::new(src).min_depth(1) {
        let entry = result.map_err(|err| Error::fs("copying assets", src)(io::Error::from(err)))?;
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            ensure_dir(&target)?;
        } else {
            fs::copy(entry.path(), &target).map_err(Error::fs("copying asset", entry.path()))?;
            debug!("copied {}", relative.display());
        }
    }
    Ok(())
}

fn rmdir(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) => match e.kind() {
            io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::fs("removing directory", dir)(e)),
        },
    }
}
