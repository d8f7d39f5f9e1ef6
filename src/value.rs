//! Converts the typed render contexts into template [`Value`]s. The key names
//! are the ones themes refer to, e.g. `{{.blogTitle}}` in a post template or
//! `{{range .articles}}{{.url}}{{end}}` in the index template.

use crate::metadata::Metadata;
use crate::render::{ArticleSummary, IndexContext, PostContext};
use gtmpl_value::Value;
use std::collections::HashMap;

fn optional(s: &Option<String>) -> Value {
    match s {
        Some(s) => Value::String(s.clone()),
        None => Value::Nil,
    }
}

impl From<&PostContext> for Value {
    fn from(ctx: &PostContext) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("blogTitle".to_owned(), Value::String(ctx.blog_title.clone()));
        m.insert("blogDesc".to_owned(), Value::String(ctx.blog_description.clone()));
        m.insert("blogAuthor".to_owned(), Value::String(ctx.blog_author.clone()));
        m.insert("articlesCount".to_owned(), (ctx.articles_count as u64).into());
        Value::Object(m)
    }
}

impl From<&ArticleSummary> for Value {
    fn from(article: &ArticleSummary) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("date".to_owned(), Value::String(article.date.clone()));
        m.insert("title".to_owned(), optional(&article.title));
        m.insert("abstract".to_owned(), optional(&article.abstract_));
        m.insert("url".to_owned(), Value::String(article.url.clone()));
        Value::Object(m)
    }
}

impl From<&IndexContext> for Value {
    fn from(ctx: &IndexContext) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("title".to_owned(), Value::String(ctx.title.clone()));
        m.insert("description".to_owned(), Value::String(ctx.description.clone()));
        m.insert("author".to_owned(), Value::String(ctx.author.clone()));
        m.insert(
            "articles".to_owned(),
            Value::Array(ctx.articles.iter().map(Value::from).collect()),
        );
        m.insert("articlesCount".to_owned(), (ctx.articles.len() as u64).into());
        Value::Object(m)
    }
}

/// Adds a post's own fields and its rendered body to a template context.
pub(crate) fn merge_post(context: &mut Value, metadata: &Metadata, content: String) {
    if let Value::Object(obj) = context {
        obj.insert("title".to_owned(), optional(&metadata.title));
        obj.insert("date".to_owned(), optional(&metadata.date));
        obj.insert("abstract".to_owned(), optional(&metadata.abstract_));
        obj.insert("content".to_owned(), Value::String(content));
    }
}
