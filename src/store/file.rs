//! TOML-file option store.
//!
//! Options live as top-level keys of a TOML document. Edits go through
//! `toml_edit`, so comments and keys written by other tools are preserved.
//! Every read goes to disk, which keeps the view fresh after a lock is taken.

use std::fs;
use std::path::{Path, PathBuf};

use toml_edit::{value, DocumentMut, Item, Value};

use super::{OptionStore, StoreError, StoreLock};
use crate::files::lock::{lock_path_for, LockFile};

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Open a store at `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<DocumentMut, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(DocumentMut::new()),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        contents.parse::<DocumentMut>().map_err(|e| StoreError::Parse {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// Write the document with a temp+rename so readers never see a partial file.
    fn save(&self, doc: &DocumentMut) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        self.ensure_parent().map_err(write_err)?;

        let mut temp = self.path.as_os_str().to_owned();
        temp.push(".tmp");
        let temp_path = PathBuf::from(temp);

        fs::write(&temp_path, doc.to_string()).map_err(write_err)?;
        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(write_err(e));
        }
        Ok(())
    }

    fn ensure_parent(&self) -> std::io::Result<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
            _ => Ok(()),
        }
    }
}

/// Render a stored item as option text. Strings come back unquoted.
fn item_to_text(item: &Item) -> Option<String> {
    match item.as_value()? {
        Value::String(s) => Some(s.value().clone()),
        Value::Integer(i) => Some(i.value().to_string()),
        Value::Float(f) => Some(f.value().to_string()),
        Value::Boolean(b) => Some(b.value().to_string()),
        other => Some(other.to_string().trim().to_string()),
    }
}

impl OptionStore for FileStore {
    fn get_option(&self, key: &str) -> Result<Option<String>, StoreError> {
        let doc = self.load()?;
        Ok(doc.as_table().get(key).and_then(item_to_text))
    }

    fn update_option(&mut self, key: &str, val: &str) -> Result<(), StoreError> {
        let mut doc = self.load()?;
        doc.insert(key, value(val));
        self.save(&doc)
    }

    fn delete_option(&mut self, key: &str) -> Result<bool, StoreError> {
        let mut doc = self.load()?;
        if doc.as_table_mut().remove(key).is_none() {
            return Ok(false);
        }
        self.save(&doc)?;
        Ok(true)
    }

    fn lock(&mut self, key: &str) -> Result<StoreLock, StoreError> {
        self.ensure_parent().map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        let lock = LockFile::acquire(&lock_path_for(&self.path, key))?;
        Ok(StoreLock::file(lock))
    }
}
