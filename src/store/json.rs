use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{validate_key, ProfileDocument, ProfileStore, StoreError};

/// One pretty-printed JSON document per profile key under a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl ProfileStore for JsonFileStore {
    fn load(&self, key: &str) -> Result<ProfileDocument, StoreError> {
        let path = self.path_for(key)?;
        if !path.exists() {
            debug!(key, "no stored document yet");
            return Ok(ProfileDocument::new(key));
        }
        let raw = fs::read_to_string(&path).map_err(io_err(&path))?;
        ProfileDocument::from_json(key, &raw)
    }

    // Write to a sibling temp file, then rename over the target.
    fn save(&self, doc: &ProfileDocument) -> Result<(), StoreError> {
        let path = self.path_for(&doc.profile_key)?;
        fs::create_dir_all(&self.dir).map_err(io_err(&self.dir))?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, doc.to_json()?).map_err(io_err(&tmp))?;
        fs::rename(&tmp, &path).map_err(io_err(&path))?;
        Ok(())
    }
}
