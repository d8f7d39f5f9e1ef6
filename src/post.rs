//! Discovers and reads post source files.

use std::fs::{self, read_dir};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

const MARKDOWN_EXTENSION: &str = ".md";

/// A post source file, read once per run.
pub struct Post {
    /// The file name within the posts directory, e.g. `hello.md`.
    pub file_name: String,

    /// The full path of the source file.
    pub path: PathBuf,

    /// The raw source text.
    pub source: String,
}

impl Post {
    /// Reads the post `file_name` from `dir`.
    pub fn read(dir: &Path, file_name: &str) -> Result<Post> {
        let path = dir.join(file_name);
        let source = fs::read_to_string(&path).map_err(Error::fs("reading post", &path))?;
        Ok(Post {
            file_name: file_name.to_owned(),
            path,
            source,
        })
    }
}

/// Lists the file names of the Markdown files in `dir`, sorted by name so
/// that repeated runs see the posts in the same order.
pub fn list_posts(dir: &Path) -> Result<Vec<String>> {
    let mut file_names = Vec::new();
    for result in read_dir(dir).map_err(Error::fs("listing posts", dir))? {
        let entry = result.map_err(Error::fs("listing posts", dir))?;
        let os_file_name = entry.file_name();
        let file_name = os_file_name.to_string_lossy();
        let is_file = entry
            .file_type()
            .map_err(Error::fs("listing posts", &entry.path()))?
            .is_file();
        if is_file && file_name.ends_with(MARKDOWN_EXTENSION) {
            file_names.push(file_name.into_owned());
        }
    }
    file_names.sort();
    Ok(file_names)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_list_posts() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.md"), "").unwrap();
        fs::write(dir.path().join("a.md"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::create_dir(dir.path().join("dir.md")).unwrap();

        assert_eq!(vec!["a.md", "b.md"], list_posts(dir.path())?);
        Ok(())
    }

    #[test]
    fn test_read_missing_post() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Post::read(dir.path(), "missing.md"),
            Err(Error::Filesystem { .. })
        ));
    }
}
