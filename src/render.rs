//! The rendering engine. [`render`] takes an optional post source, a theme
//! [`Template`] and a context, and returns the post's [`Metadata`] together
//! with the finished HTML. [`SiteRenderer`] wraps it with the typed contexts
//! of the two kinds of page: posts ([`PostContext`]) and the index
//! ([`IndexContext`]).

use std::fs;
use std::path::Path;
use std::string::FromUtf8Error;

use gtmpl_value::Value;
use lol_html::errors::RewritingError;

use crate::markdown;
use crate::metadata::{self, Metadata};

/// A parsed theme template.
pub struct Template(gtmpl::Template);

impl Template {
    /// Parses template text.
    pub fn parse(text: &str) -> Result<Template> {
        let mut template = gtmpl::Template::default();
        template
            .parse(text)
            .map_err(|e| Error::Template(e.to_string()))?;
        Ok(Template(template))
    }

    /// Reads and parses a template file. Reading errors are filesystem
    /// errors; parse errors are render errors.
    pub fn load(path: &Path) -> crate::error::Result<Template> {
        use crate::error::Error as CrateError;
        let text = fs::read_to_string(path).map_err(CrateError::fs("reading template", path))?;
        Template::parse(&text).map_err(CrateError::render(path))
    }

    fn execute(&self, value: Value) -> Result<String> {
        let context = gtmpl::Context::from(value).map_err(|e| Error::Template(e.to_string()))?;
        let mut out: Vec<u8> = Vec::new();
        self.0
            .execute(&mut out, &context)
            .map_err(|e| Error::Template(e.to_string()))?;
        Ok(String::from_utf8(out)?)
    }
}

/// Renders `template` with `context`. When a post `source` is given, its
/// frontmatter is extracted and its body converted to HTML; both are added to
/// the context as `title`, `date`, `abstract` and `content`. Without a source
/// the returned metadata is empty.
pub fn render(
    source: Option<&str>,
    template: &Template,
    mut context: Value,
) -> Result<(Metadata, String)> {
    let metadata = match source {
        None => Metadata::default(),
        Some(source) => {
            let (metadata, body) = metadata::split(source)?;
            let mut content = String::new();
            markdown::to_html(&mut content, body);
            crate::value::merge_post(&mut context, &metadata, content);
            metadata
        }
    };
    let html = template.execute(context)?;
    Ok((metadata, html))
}

/// The settings made available to post templates.
#[derive(Clone, Debug)]
pub struct PostContext {
    pub blog_title: String,
    pub blog_description: String,
    pub blog_author: String,

    /// The number of posts in the site.
    pub articles_count: usize,
}

/// One entry of the index listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArticleSummary {
    pub date: String,
    pub title: Option<String>,
    pub abstract_: Option<String>,

    /// The root-relative URL of the post page.
    pub url: String,
}

/// The settings and post listing made available to the index template.
#[derive(Clone, Debug)]
pub struct IndexContext {
    pub title: String,
    pub description: String,
    pub author: String,

    /// The posts in listing order.
    pub articles: Vec<ArticleSummary>,
}

/// Renders post pages and the index page with a theme's templates.
pub struct SiteRenderer {
    post: Template,
    index: Template,
}

impl SiteRenderer {
    pub fn new(post: Template, index: Template) -> SiteRenderer {
        SiteRenderer { post, index }
    }

    /// Loads the post and index templates.
    pub fn load(post: &Path, index: &Path) -> crate::error::Result<SiteRenderer> {
        Ok(SiteRenderer::new(Template::load(post)?, Template::load(index)?))
    }

    /// Renders a single post, returning its metadata and the page HTML.
    pub fn render_post(&self, source: &str, context: &PostContext) -> Result<(Metadata, String)> {
        render(Some(source), &self.post, context.into())
    }

    /// Renders the index page.
    pub fn render_index(&self, context: &IndexContext) -> Result<String> {
        let (_, html) = render(None, &self.index, context.into())?;
        Ok(html)
    }
}

/// The result of a fallible render.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error rendering a page.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the post's frontmatter can't be extracted.
    #[error(transparent)]
    Metadata(#[from] metadata::Error),

    /// Returned for template parse and execution errors.
    #[error("template: {0}")]
    Template(String),

    /// Returned when the template produces invalid UTF-8.
    #[error("template output: {0}")]
    Utf8(#[from] FromUtf8Error),

    /// Returned when the rendered page's links can't be rewritten.
    #[error("rewriting links: {0}")]
    Links(#[from] RewritingError),
}

#[cfg(test)]
mod test {
    use super::*;

    fn renderer() -> SiteRenderer {
        SiteRenderer::new(
            Template::parse(
                "{{.blogTitle}}|{{.blogAuthor}}|{{.articlesCount}}|{{.title}}|{{.date}}|{{.content}}",
            )
            .unwrap(),
            Template::parse(concat!(
                "{{.title}} by {{.author}} ({{.articlesCount}})",
                "{{range .articles}}<a href=\"{{.url}}\">{{.title}}</a>{{.abstract}};{{end}}",
            ))
            .unwrap(),
        )
    }

    fn post_context() -> PostContext {
        PostContext {
            blog_title: "Notes".to_owned(),
            blog_description: "A blog".to_owned(),
            blog_author: "Ada".to_owned(),
            articles_count: 3,
        }
    }

    #[test]
    fn test_render_post() -> Result<()> {
        let (metadata, html) = renderer().render_post(
            "---\ndate: 2023/5/1\ntitle: Hello World\n---\nSome *text*.\n",
            &post_context(),
        )?;
        assert_eq!(Some("Hello World"), metadata.title.as_deref());
        assert_eq!(
            "Notes|Ada|3|Hello World|2023/5/1|<p>Some <em>text</em>.</p>\n",
            html
        );
        Ok(())
    }

    #[test]
    fn test_render_post_without_frontmatter() {
        assert!(matches!(
            renderer().render_post("# No frontmatter\n", &post_context()),
            Err(Error::Metadata(metadata::Error::MissingStartFence))
        ));
    }

    #[test]
    fn test_render_index() -> Result<()> {
        let html = renderer().render_index(&IndexContext {
            title: "Notes".to_owned(),
            description: "A blog".to_owned(),
            author: "Ada".to_owned(),
            articles: vec![
                ArticleSummary {
                    date: "2023/5/1".to_owned(),
                    title: Some("Hello World".to_owned()),
                    abstract_: Some("First.".to_owned()),
                    url: "/posts/2023/5/1/Hello_World/index.html".to_owned(),
                },
                ArticleSummary {
                    date: "2023/5/2".to_owned(),
                    title: Some("Second".to_owned()),
                    abstract_: Some("Next.".to_owned()),
                    url: "/posts/2023/5/2/Second/index.html".to_owned(),
                },
            ],
        })?;
        assert_eq!(
            concat!(
                "Notes by Ada (2)",
                "<a href=\"/posts/2023/5/1/Hello_World/index.html\">Hello World</a>First.;",
                "<a href=\"/posts/2023/5/2/Second/index.html\">Second</a>Next.;",
            ),
            html
        );
        Ok(())
    }

    #[test]
    fn test_template_parse_error() {
        assert!(matches!(Template::parse("{{.title"), Err(Error::Template(_))));
    }
}
