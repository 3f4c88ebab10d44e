//! File-backed key-value store
//!
//! Stores each key as its own JSON file inside a single directory, writing
//! through a temporary file so a crash never leaves a half-written value.

use std::io::ErrorKind;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use super::{KeyValueStore, StoreError};

/// Longest file stem written, leaving room for `.json.tmp` under the usual
/// 255-byte file name limit
const MAX_STEM_LEN: usize = 200;

/// Hex digits of the key digest in a hashed file name
const DIGEST_LEN: usize = 16;

/// Key-value store keeping one file per key on disk
///
/// File names are the percent-encoded key. Keys whose encoding would not fit
/// a file name are stored under a truncated prefix plus a digest of the full
/// key, and the file records the key so a digest collision reads as missing.
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Directory where value files are stored
    dir: PathBuf,
}

/// Where a key lives on disk
#[derive(Debug, Clone, PartialEq, Eq)]
struct FileName {
    name: String,
    /// Whether the name carries a digest and the file an `Envelope`
    hashed: bool,
}

/// Content of a hashed file: the full key next to its value
#[derive(Debug, Deserialize)]
struct Envelope {
    key: String,
    value: String,
}

#[derive(Debug, Serialize)]
struct EnvelopeRef<'a> {
    key: &'a str,
    value: &'a str,
}

impl FileStore {
    /// Creates a FileStore rooted at `dir`
    ///
    /// The directory is created on the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the path of the file backing `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(file_name(key).name)
    }
}

impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let file = file_name(key);
        let content = match fs::read_to_string(self.dir.join(&file.name)).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        if !file.hashed {
            return Ok(Some(content));
        }

        let envelope: Envelope = serde_json::from_str(&content)
            .map_err(|err| StoreError::Corrupt(format!("{}: {}", file.name, err)))?;
        if envelope.key != key {
            debug!(key, file = %file.name, "store file belongs to another key");
            return Ok(None);
        }
        Ok(Some(envelope.value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).await?;

        let file = file_name(key);
        let content = if file.hashed {
            serde_json::to_string(&EnvelopeRef { key, value })?
        } else {
            value.to_string()
        };

        let path = self.dir.join(&file.name);
        let tmp = self.dir.join(format!("{}.tmp", file.name));
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, &path).await?;

        debug!(key, path = %path.display(), "wrote store entry");
        Ok(())
    }
}

/// Maps a key to a file name
///
/// Plain names have stems shorter than `MAX_STEM_LEN`; hashed stems are exactly
/// `MAX_STEM_LEN` long, so the two forms never overlap.
fn file_name(key: &str) -> FileName {
    let encoded = urlencoding::encode(key);
    if encoded.len() < MAX_STEM_LEN {
        return FileName {
            name: format!("{}.json", encoded),
            hashed: false,
        };
    }

    // The encoding is ASCII, so any byte offset is a char boundary
    let prefix = &encoded[..MAX_STEM_LEN - DIGEST_LEN - 1];
    FileName {
        name: format!("{}~{:016x}.json", prefix, fnv1a(key.as_bytes())),
        hashed: true,
    }
}

/// 64-bit FNV-1a, stable across builds so names survive upgrades
fn fnv1a(data: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    data.iter().fold(OFFSET_BASIS, |hash, &byte| {
        (hash ^ u64::from(byte)).wrapping_mul(PRIME)
    })
}
