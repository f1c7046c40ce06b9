//! Content-addressed file cache under `<home>/files`.
//!
//! Files are stored under the hex SHA-256 of their contents, so adding the
//! same bytes twice is a no-op and a name always identifies its content.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// Handle to an on-disk file cache.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Open the cache, creating its directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Store `data` and return its name.
    pub fn add_file(&self, data: &[u8]) -> io::Result<String> {
        let name = hex::encode(Sha256::digest(data));
        let path = self.dir.join(&name);
        if !path.exists() {
            // Write then rename so readers never see a partial file.
            let tmp = self.dir.join(format!("{}.tmp", name));
            fs::write(&tmp, data)?;
            fs::rename(&tmp, &path)?;
        }
        Ok(name)
    }

    /// Read a file previously stored with [`FileCache::add_file`].
    pub fn get_file(&self, name: &str) -> io::Result<Vec<u8>> {
        if name.len() != 64 || !name.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid file name '{}'", name),
            ));
        }
        fs::read(self.dir.join(name))
    }
}
