//! Defines [`Metadata`] and the logic for extracting it from a post's
//! frontmatter. A post source file is structured as follows:
//!
//! 1. Initial frontmatter fence (`---`)
//! 2. YAML frontmatter with the optional fields `date`, `title` and
//!    `abstract`
//! 3. Terminal frontmatter fence (`---`)
//! 4. Post body
//!
//! For example:
//!
//! ```md
//! ---
//! date: 2023/5/1
//! title: Hello World
//! abstract: The first post.
//! ---
//! # Hello
//!
//! World
//! ```

use serde_yaml::{Mapping, Value};

const FENCE: &str = "---";

/// The recognized frontmatter fields of a post. Every field is optional;
/// missing fields are filled in with defaults by [`crate::path::PathResolver`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Metadata {
    /// The post date in `Y/M/D` form, verbatim.
    pub date: Option<String>,

    /// The post title.
    pub title: Option<String>,

    /// A short summary shown on the index page.
    pub abstract_: Option<String>,
}

/// The three components of a `Y/M/D` date, verbatim.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateParts<'a> {
    pub year: &'a str,
    pub month: &'a str,
    pub day: &'a str,
}

impl Metadata {
    /// Splits the `date` field into its year, month and day. Returns `None`
    /// unless the date has exactly three `/`-separated components, each usable
    /// as a directory name. The components are not validated as a calendar
    /// date.
    pub fn date_parts(&self) -> Option<DateParts<'_>> {
        let date = self.date.as_deref()?;
        match *date.split('/').collect::<Vec<_>>() {
            [year, month, day] if [year, month, day].into_iter().all(is_dir_name) => {
                Some(DateParts { year, month, day })
            }
            _ => None,
        }
    }

    /// Returns the directory name for the post's title (spaces become
    /// underscores), or `None` if the post has no usable title.
    pub fn slug(&self) -> Option<String> {
        self.title
            .as_deref()
            .filter(|title| !title.trim().is_empty())
            .map(|title| title.replace(' ', "_"))
    }

    fn from_mapping(mapping: &Mapping) -> Result<Metadata> {
        let metadata = Metadata {
            date: field(mapping, "date")?,
            title: field(mapping, "title")?,
            abstract_: field(mapping, "abstract")?,
        };
        match metadata.slug() {
            Some(slug) if !is_dir_name(&slug) => Err(Error::InvalidField("title")),
            _ => Ok(metadata),
        }
    }
}

// A single path segment that stays inside its parent directory.
fn is_dir_name(segment: &str) -> bool {
    !segment.is_empty() && segment != "." && segment != ".." && !segment.contains(['/', '\\'])
}

/// Extracts the [`Metadata`] from a post's source text without rendering the
/// body.
pub fn extract(source: &str) -> Result<Metadata> {
    split(source).map(|(metadata, _)| metadata)
}

/// Separates a post's source text into its [`Metadata`] and its Markdown body.
pub fn split(source: &str) -> Result<(Metadata, &str)> {
    let (yaml, body) = frontmatter(source)?;
    if yaml.trim().is_empty() {
        return Ok((Metadata::default(), body));
    }
    let metadata = match serde_yaml::from_str::<Value>(yaml)? {
        Value::Null => Metadata::default(),
        Value::Mapping(mapping) => Metadata::from_mapping(&mapping)?,
        _ => return Err(Error::NotAMapping),
    };
    Ok((metadata, body))
}

// Returns the YAML between the fences and the body after the closing fence.
fn frontmatter(input: &str) -> Result<(&str, &str)> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let rest = match input.strip_prefix(FENCE) {
        Some(rest) if rest.starts_with('\n') || rest.starts_with("\r\n") => rest,
        _ => return Err(Error::MissingStartFence),
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if offset > 0 && line.trim_end() == FENCE {
            return Ok((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    Err(Error::MissingEndFence)
}

fn field(mapping: &Mapping, key: &'static str) -> Result<Option<String>> {
    match mapping.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(_) => Err(Error::InvalidField(key)),
    }
}

/// Represents the result of a metadata extraction.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error extracting [`Metadata`] from a post.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a post source file is missing its starting frontmatter
    /// fence (`---`).
    #[error("post must begin with `---`")]
    MissingStartFence,

    /// Returned when the starting fence was found but the ending one was
    /// missing.
    #[error("missing closing `---`")]
    MissingEndFence,

    /// Returned when the frontmatter is not valid YAML.
    #[error("parsing frontmatter: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Returned when the frontmatter is valid YAML but not a mapping.
    #[error("frontmatter must be a mapping of keys to values")]
    NotAMapping,

    /// Returned when a recognized key holds a sequence or a mapping, or when
    /// the title can't be used as a single directory name (it contains `/` or
    /// `\`, or is `.` or `..`).
    #[error("frontmatter field `{0}` is invalid")]
    InvalidField(&'static str),

    /// Returned when a field required for the index listing is missing.
    #[error("frontmatter field `{0}` is missing")]
    MissingField(&'static str),

    /// Returned when the `date` field is not of the form `Y/M/D`.
    #[error("date `{0}` is not of the form `Y/M/D`")]
    MalformedDate(String),
}
