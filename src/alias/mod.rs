mod error;

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use error::StoreError;

#[cfg(not(feature = "log"))]
use crate::{debug, info, warn};
#[cfg(feature = "log")]
use log::{debug, info, warn};

const DB_VERSION: u32 = 1;

/// A name bound to a hardware address and, optionally, the interface to wake it through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub name: String,
    pub mac: String,
    pub iface: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Record {
    mac: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iface: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Database {
    version: u32,
    #[serde(default)]
    aliases: BTreeMap<String, Record>,
}

impl Default for Database {
    fn default() -> Self {
        Self { version: DB_VERSION, aliases: BTreeMap::new() }
    }
}

/// File backed alias directory.
///
/// Every mutation is written through to disk before returning: the new content
/// goes to a sibling `.tmp` file which is synced and then renamed over the
/// database, so readers only ever see the old or the new file.
///
/// There is no locking between processes. Two invocations mutating the store
/// at the same time may lose one of the writes.
#[derive(Debug)]
pub struct AliasStore {
    path: PathBuf,
    db: Database,
    written: bool,
    closed: bool,
}

impl AliasStore {
    /// Opens the database at `path`. A missing file is an empty store; the file
    /// and its parent directories are created on the first write.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<AliasStore, StoreError> {
        let path = path.as_ref().to_path_buf();
        let db = if path.exists() {
            if path.is_dir() {
                return Err(StoreError::from(io::Error::new(
                    io::ErrorKind::Other,
                    format!("{} is a directory", path.display()),
                )));
            }
            debug!("loading aliases from {:?}", path);
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                Database::default()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            info!("alias database {:?} does not exist yet, starting empty", path);
            Database::default()
        };
        debug!("{} aliases loaded", db.aliases.len());
        Ok(AliasStore { path, db, written: false, closed: false })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Inserts or overwrites `name`. An empty `iface` is the same as none.
    pub fn add(&mut self, name: &str, mac: &str, iface: Option<&str>) -> Result<(), StoreError> {
        let record = Record {
            mac: mac.to_owned(),
            iface: iface.filter(|i| !i.is_empty()).map(str::to_owned),
        };
        let previous = self.db.aliases.insert(name.to_owned(), record);
        if let Err(e) = self.persist() {
            match previous {
                Some(p) => self.db.aliases.insert(name.to_owned(), p),
                None => self.db.aliases.remove(name),
            };
            return Err(e);
        }
        match previous {
            Some(_) => info!("alias {} overwritten", name),
            None => info!("alias {} added", name),
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Alias, StoreError> {
        self.db.aliases
            .get(name)
            .map(|r| to_alias(name, r))
            .ok_or_else(|| StoreError::NotFound(name.to_owned()))
    }

    /// All aliases, ordered by name.
    pub fn list(&self) -> Result<BTreeMap<String, Alias>, StoreError> {
        Ok(self.db.aliases
            .iter()
            .map(|(n, r)| (n.clone(), to_alias(n, r)))
            .collect())
    }

    pub fn del(&mut self, name: &str) -> Result<(), StoreError> {
        let previous = match self.db.aliases.remove(name) {
            Some(r) => r,
            None => return Err(StoreError::NotFound(name.to_owned())),
        };
        if let Err(e) = self.persist() {
            self.db.aliases.insert(name.to_owned(), previous);
            return Err(e);
        }
        info!("alias {} removed", name);
        Ok(())
    }

    /// Releases the store. Must be called once before exit; the rename of the
    /// last write is made durable here.
    pub fn close(mut self) -> Result<(), StoreError> {
        self.finish()
    }

    fn finish(&mut self) -> Result<(), StoreError> {
        self.closed = true;
        if self.written {
            debug!("syncing directory of {:?}", self.path);
            sync_parent(&self.path)?;
        }
        Ok(())
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                debug!("creating directory {:?}", parent);
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.tmp_path();
        let mut f = File::create(&tmp)?;
        serde_json::to_writer_pretty(&mut f, &self.db)?;
        f.write_all(b"\n")?;
        f.sync_all()?;
        fs::rename(&tmp, &self.path)?;
        self.written = true;
        debug!("alias database written to {:?}", self.path);
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut p = self.path.clone().into_os_string();
        p.push(".tmp");
        PathBuf::from(p)
    }
}

impl Drop for AliasStore {
    fn drop(&mut self) {
        if !self.closed {
            warn!("alias store dropped without being closed");
            if let Err(e) = self.finish() {
                warn!("while closing alias store: {}", e);
            }
        }
    }
}

fn to_alias(name: &str, r: &Record) -> Alias {
    Alias {
        name: name.to_owned(),
        mac: r.mac.clone(),
        iface: r.iface.clone(),
    }
}

#[cfg(unix)]
fn sync_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => File::open(p)?.sync_all(),
        _ => Ok(()),
    }
}

#[cfg(not(unix))]
fn sync_parent(_path: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_iface_is_none() {
        let dir = TempDir::new().unwrap();
        let mut store = AliasStore::open(dir.path().join("aliases.json")).unwrap();
        store.add("nas", "00:11:22:33:44:55", Some("")).unwrap();
        assert_eq!(store.get("nas").unwrap().iface, None);
        store.close().unwrap();
    }

    #[test]
    fn failed_write_leaves_memory_untouched() {
        let dir = TempDir::new().unwrap();
        // a directory where the temp file should go makes File::create fail
        let path = dir.path().join("aliases.json");
        fs::create_dir(dir.path().join("aliases.json.tmp")).unwrap();
        let mut store = AliasStore::open(&path).unwrap();
        assert!(matches!(store.add("nas", "00:11:22:33:44:55", None), Err(StoreError::IOError(_))));
        assert!(store.get("nas").unwrap_err().is_not_found());
        assert!(!path.exists());
        store.close().unwrap();
    }

    #[test]
    fn tmp_path_is_sibling() {
        let store = AliasStore::open("/nonexistent/wol/aliases.json").unwrap();
        assert_eq!(store.tmp_path(), PathBuf::from("/nonexistent/wol/aliases.json.tmp"));
        store.close().unwrap();
    }

    #[test]
    fn corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("aliases.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(AliasStore::open(&path), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn zero_length_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("aliases.json");
        fs::write(&path, "").unwrap();
        let store = AliasStore::open(&path).unwrap();
        assert!(store.list().unwrap().is_empty());
        store.close().unwrap();
    }
}
