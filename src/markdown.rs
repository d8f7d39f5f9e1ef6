use pulldown_cmark::{html, Options, Parser};

/// Converts a post's Markdown body to HTML, appending the result to `out`.
pub fn to_html(out: &mut String, markdown: &str) {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    html::push_html(out, Parser::new_ext(markdown, options));
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_to_html() {
        let mut out = String::new();
        to_html(&mut out, "# Hi\n\nSome ~~old~~ [link](other.html).\n");
        assert!(out.contains("<h1>Hi</h1>"));
        assert!(out.contains("<del>old</del>"));
        assert!(out.contains(r#"<a href="other.html">link</a>"#));
    }

    #[test]
    fn test_tables() {
        let mut out = String::new();
        to_html(&mut out, "| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(out.contains("<table>"));
        assert!(out.contains("<td>1</td>"));
    }
}
