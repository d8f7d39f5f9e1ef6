//! Rewrites the links of rendered pages to be root-relative. A post page lives
//! four directories deep (`posts/2023/5/1/Hello_World/index.html`), so a
//! relative link such as `posts/2023/5/2/Next/index.html` written in a post or
//! a theme template would resolve against the wrong directory. [`rewrite`]
//! resolves every such link against the site root instead, so a page links
//! the same way regardless of where it is nested.

use std::error::Error as StdError;
use std::path::Path;
use std::sync::LazyLock;

use lol_html::errors::RewritingError;
use lol_html::html_content::Element;
use lol_html::{element, rewrite_str, RewriteStrSettings};
use url::{ParseError, Url};

// Only the path of the joined URL is kept, so the host never shows up in the
// output.
static SITE_ROOT: LazyLock<Url> = LazyLock::new(|| Url::parse("http://site.invalid/").unwrap());

/// Converts individual link targets to root-relative URLs.
pub struct Converter {
    /// The output root as it may appear at the start of a link, with forward
    /// slashes and without leading `./` or trailing `/`.
    output_root: String,
    site: Url,
}

impl Converter {
    pub fn new(output_root: &Path) -> Converter {
        let root = output_root.to_string_lossy().replace('\\', "/");
        let root = root.strip_prefix("./").unwrap_or(&root);
        Converter {
            output_root: root.trim_end_matches('/').to_owned(),
            site: SITE_ROOT.clone(),
        }
    }

    /// Converts a single link target. Fragments, absolute URLs and
    /// root-relative URLs are returned as they are; a leading output root is
    /// stripped; everything else is resolved against the site root.
    pub fn convert(&self, link: &str) -> Result<String, ParseError> {
        let link = link.trim();
        if let Some(rest) = self.strip_output_root(link) {
            return self.resolve(rest);
        }
        if link.is_empty() || link.starts_with('#') || link.starts_with('/') {
            return Ok(link.to_owned());
        }
        match Url::parse(link) {
            Ok(_) => Ok(link.to_owned()),
            Err(ParseError::RelativeUrlWithoutBase) => self.resolve(link),
            Err(e) => Err(e),
        }
    }

    fn strip_output_root<'l>(&self, link: &'l str) -> Option<&'l str> {
        if self.output_root.is_empty() {
            return None;
        }
        let link = link.strip_prefix("./").unwrap_or(link);
        match link.strip_prefix(self.output_root.as_str())? {
            "" => Some(""),
            rest => rest.strip_prefix('/'),
        }
    }

    fn resolve(&self, relative: &str) -> Result<String, ParseError> {
        let url = self.site.join(relative)?;
        let mut resolved = url.path().to_owned();
        if let Some(query) = url.query() {
            resolved.push('?');
            resolved.push_str(query);
        }
        if let Some(fragment) = url.fragment() {
            resolved.push('#');
            resolved.push_str(fragment);
        }
        Ok(resolved)
    }
}

/// Rewrites the `href` and `src` attributes of `html` with a [`Converter`]
/// for `output_root`.
pub fn rewrite(html: &str, output_root: &Path) -> Result<String, RewritingError> {
    let converter = Converter::new(output_root);
    let rewritten = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("a[href]", |el| convert_attribute(el, "href", &converter)),
                element!("link[href]", |el| convert_attribute(el, "href", &converter)),
                element!("img[src]", |el| convert_attribute(el, "src", &converter)),
                element!("script[src]", |el| convert_attribute(el, "src", &converter)),
                element!("source[src]", |el| convert_attribute(el, "src", &converter)),
                element!("iframe[src]", |el| convert_attribute(el, "src", &converter)),
            ],
            ..RewriteStrSettings::new()
        },
    );
    rewritten
}

fn convert_attribute(
    el: &mut Element<'_, '_>,
    attribute: &str,
    converter: &Converter,
) -> Result<(), Box<dyn StdError + Send + Sync>> {
    if let Some(value) = el.get_attribute(attribute) {
        let converted = converter.convert(&value)?;
        if converted != value {
            el.set_attribute(attribute, &converted)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn convert(output_root: &str, link: &str) -> String {
        Converter::new(Path::new(output_root)).convert(link).unwrap()
    }

    #[test]
    fn test_convert_relative_link() {
        assert_eq!(
            "/posts/2023/5/1/Hello_World/index.html",
            convert("public", "posts/2023/5/1/Hello_World/index.html")
        );
    }

    #[test]
    fn test_convert_leading_dotslash() {
        assert_eq!("/style.css", convert("public", "./style.css"));
    }

    #[test]
    fn test_convert_redundancies_are_clamped_at_root() {
        assert_eq!("/style.css", convert("public", "../../css/../style.css"));
    }

    #[test]
    fn test_convert_strips_output_root() {
        assert_eq!("/posts/a/index.html", convert("public", "public/posts/a/index.html"));
        assert_eq!("/img/cat.png", convert("./public/", "./public/img/cat.png"));
        assert_eq!("/", convert("public", "public"));
    }

    #[test]
    fn test_convert_strips_absolute_output_root() {
        assert_eq!(
            "/posts/a/index.html",
            convert("/tmp/site/public", "/tmp/site/public/posts/a/index.html")
        );
    }

    #[test]
    fn test_convert_does_not_strip_similar_prefix() {
        assert_eq!("/publicity.html", convert("public", "publicity.html"));
    }

    #[test]
    fn test_convert_keeps_query_and_fragment() {
        assert_eq!("/search.html?q=rust#top", convert("public", "search.html?q=rust#top"));
    }

    #[test]
    fn test_convert_leaves_other_links_alone() {
        for link in [
            "https://example.org/posts/a.html",
            "mailto:someone@example.org",
            "//cdn.example.org/lib.js",
            "/already/rooted.html",
            "#footnote-1",
            "",
        ] {
            assert_eq!(link, convert("public", link));
        }
    }

    #[test]
    fn test_rewrite_html() {
        let html = concat!(
            r#"<link rel="stylesheet" href="style.css">"#,
            r#"<p><a href="posts/2023/5/2/Next/index.html">next</a> "#,
            r#"<a href="https://example.org">out</a> "#,
            r#"<img src="./public/img/cat.png" alt="cat"></p>"#,
        );
        let rewritten = rewrite(html, Path::new("public")).unwrap();
        assert!(rewritten.contains(r#"href="/style.css""#));
        assert!(rewritten.contains(r#"href="/posts/2023/5/2/Next/index.html""#));
        assert!(rewritten.contains(r#"href="https://example.org""#));
        assert!(rewritten.contains(r#"src="/img/cat.png""#));
        assert!(rewritten.contains(r#"alt="cat""#));
    }

    #[test]
    fn test_rewrite_rejects_invalid_url() {
        assert!(rewrite(r#"<a href="http://[::1">x</a>"#, Path::new("public")).is_err());
    }
}
