//! Derives where a post is written. A post with metadata `date: 2023/5/1` and
//! `title: Hello World` lands at `posts/2023/5/1/Hello_World/index.html`
//! under the output root. Missing or malformed metadata falls back to the
//! [`Clock`]'s current date and an `Untitled{n}` slug drawn from an
//! [`IdGenerator`].

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Local, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};
use crate::metadata::Metadata;

/// The directory under the output root holding all post pages.
pub const POSTS_DIRECTORY: &str = "posts";

/// The file name of every generated page.
pub const INDEX_FILE: &str = "index.html";

const UNTITLED: &str = "Untitled";

/// Supplies the date used for posts without a usable `date`.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// The local system date.
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always returns the same date.
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Supplies the numeric suffix of untitled post slugs.
pub trait IdGenerator {
    fn next_id(&mut self) -> u64;
}

/// Draws suffixes from the thread-local random source.
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&mut self) -> u64 {
        rand::random::<u32>() as u64
    }
}

/// Draws suffixes from a seeded generator, so the sequence repeats across
/// runs.
pub struct SeededIds(StdRng);

impl SeededIds {
    pub fn new(seed: u64) -> Self {
        SeededIds(StdRng::seed_from_u64(seed))
    }
}

impl IdGenerator for SeededIds {
    fn next_id(&mut self) -> u64 {
        self.0.random::<u32>() as u64
    }
}

/// The location of a post page, relative to the output root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputPath {
    pub year: String,
    pub month: String,
    pub day: String,
    pub slug: String,
}

impl OutputPath {
    /// `posts/{year}/{month}/{day}/{slug}`
    pub fn relative_dir(&self) -> PathBuf {
        Path::new(POSTS_DIRECTORY)
            .join(&self.year)
            .join(&self.month)
            .join(&self.day)
            .join(&self.slug)
    }

    /// `posts/{year}/{month}/{day}/{slug}/index.html`
    pub fn relative_file(&self) -> PathBuf {
        self.relative_dir().join(INDEX_FILE)
    }

    /// The root-relative URL of the page, e.g.
    /// `/posts/2023/5/1/Hello_World/index.html`.
    pub fn url(&self) -> String {
        format!(
            "/{}/{}/{}/{}/{}/{}",
            POSTS_DIRECTORY, self.year, self.month, self.day, self.slug, INDEX_FILE
        )
    }
}

/// Computes [`OutputPath`]s for posts and creates their directories.
pub struct PathResolver {
    clock: Box<dyn Clock>,
    ids: Box<dyn IdGenerator>,

    /// Untitled slugs handed out during this run.
    untitled: HashSet<String>,
}

impl PathResolver {
    pub fn new(clock: Box<dyn Clock>, ids: Box<dyn IdGenerator>) -> PathResolver {
        PathResolver {
            clock,
            ids,
            untitled: HashSet::new(),
        }
    }

    /// A resolver backed by the system date and random suffixes.
    pub fn system() -> PathResolver {
        PathResolver::new(Box::new(SystemClock), Box::new(RandomIds))
    }

    /// Computes the output location for a post. A `date` with three
    /// components is used verbatim; anything else falls back to today's date.
    /// A post without a title gets a fresh `Untitled{n}` slug that no other
    /// post in this run shares.
    pub fn resolve(&mut self, metadata: &Metadata) -> OutputPath {
        let (year, month, day) = match metadata.date_parts() {
            Some(parts) => (
                parts.year.to_owned(),
                parts.month.to_owned(),
                parts.day.to_owned(),
            ),
            None => {
                let today = self.clock.today();
                (
                    today.year().to_string(),
                    today.month().to_string(),
                    today.day().to_string(),
                )
            }
        };

        let slug = match metadata.slug() {
            Some(slug) => slug,
            None => self.untitled_slug(),
        };

        OutputPath {
            year,
            month,
            day,
            slug,
        }
    }

    fn untitled_slug(&mut self) -> String {
        loop {
            let slug = format!("{}{}", UNTITLED, self.ids.next_id());
            if self.untitled.insert(slug.clone()) {
                return slug;
            }
        }
    }

    /// Creates the year, month and day directories under `output_root` if
    /// they are absent, then (re-)creates the slug directory. Returns the path
    /// of the page file.
    pub fn scaffold(&self, output_root: &Path, path: &OutputPath) -> Result<PathBuf> {
        let relative = path.relative_dir();
        let mut dir = output_root.to_path_buf();
        if let Some(date_dir) = relative.parent() {
            for segment in date_dir.components() {
                dir.push(segment);
                ensure_dir(&dir)?;
            }
        }
        let dir = output_root.join(&relative);
        fs::create_dir_all(&dir).map_err(Error::fs("creating directory", &dir))?;
        Ok(output_root.join(path.relative_file()))
    }
}

/// Creates `dir` unless it already exists as a directory.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    match fs::create_dir(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(e) => Err(Error::fs("creating directory", dir)(e)),
    }
}
