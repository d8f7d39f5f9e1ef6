//! Hands the finished index page to a content-addressed publish service. The
//! service is abstracted behind [`Publisher`]; [`ContentStore`] is a local
//! implementation that files content under its SHA-1 digest.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use url::Url;

/// The identifier a [`Publisher`] returns for published content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentId(pub String);

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A published file: its content identifier and the gateway URL serving it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Published {
    pub id: ContentId,
    pub url: Url,
}

/// Publishes a file and returns its content identifier.
pub trait Publisher {
    fn publish(&self, path: &Path) -> Result<ContentId>;
}

/// Stores published files under `{root}/{sha1}`.
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    pub fn new(root: impl Into<PathBuf>) -> ContentStore {
        ContentStore { root: root.into() }
    }
}

impl Publisher for ContentStore {
    fn publish(&self, path: &Path) -> Result<ContentId> {
        let content = fs::read(path)?;
        let id = ContentId(sha1_smol::Sha1::from(&content).digest().to_string());
        fs::create_dir_all(&self.root)?;
        let target = self.root.join(&id.0);
        if !target.is_file() {
            fs::write(&target, &content)?;
        }
        Ok(id)
    }
}

/// Publishes the index page at `path` and builds its URL under `gateway`. The
/// identifier is appended to the gateway's path, whether or not it ends with
/// `/`.
pub fn publish_index(publisher: &dyn Publisher, path: &Path, gateway: &Url) -> Result<Published> {
    let id = publisher.publish(path)?;
    let mut base = gateway.clone();
    if !base.path().ends_with('/') {
        base.set_path(&format!("{}/", base.path()));
    }
    let url = base.join(&id.0)?;
    log::info!("published {} as {}", path.display(), id);
    Ok(Published { id, url })
}

/// The result of a fallible publish operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error publishing a file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned for I/O errors reading or storing the file.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Returned when the gateway URL can't be joined with the identifier.
    #[error("building gateway URL: {0}")]
    Url(#[from] url::ParseError),

    /// Returned by publish services for their own failures.
    #[error("{0}")]
    Service(String),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_content_store() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let index = dir.path().join("index.html");
        fs::write(&index, "hello")?;

        let store = ContentStore::new(dir.path().join("store"));
        let published = publish_index(
            &store,
            &index,
            &Url::parse("https://ipfs.io/ipfs/")?,
        )?;

        // sha1("hello")
        let digest = "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d";
        assert_eq!(ContentId(digest.to_owned()), published.id);
        assert_eq!(format!("https://ipfs.io/ipfs/{}", digest), published.url.as_str());
        assert_eq!("hello", fs::read_to_string(dir.path().join("store").join(digest))?);
        Ok(())
    }

    #[test]
    fn test_gateway_without_trailing_slash() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let index = dir.path().join("index.html");
        fs::write(&index, "hello")?;

        let store = ContentStore::new(dir.path().join("store"));
        let published = publish_index(&store, &index, &Url::parse("https://ipfs.io/ipfs")?)?;
        assert_eq!(
            "https://ipfs.io/ipfs/aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d",
            published.url.as_str()
        );
        Ok(())
    }

    #[test]
    fn test_content_store_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path().join("store"));
        assert!(matches!(
            store.publish(&dir.path().join("missing.html")),
            Err(Error::Io(_))
        ));
    }
}
