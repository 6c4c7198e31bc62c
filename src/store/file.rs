//! Simple file-backed [`TokenVault`] for lightweight deployments and bots.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	store::{StoreError, StoreFuture, TokenVault},
};

/// Persists vault entries to a JSON file after each mutation.
#[derive(Clone, Debug)]
pub struct FileVault {
	path: PathBuf,
	inner: Arc<RwLock<BTreeMap<String, String>>>,
}
impl FileVault {
	/// Opens (or creates) a vault at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = if path.exists() { Self::load_snapshot(&path)? } else { BTreeMap::new() };

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	fn load_snapshot(path: &Path) -> Result<BTreeMap<String, String>, StoreError> {
		if !path.exists() {
			return Ok(BTreeMap::new());
		}

		let metadata = path.metadata().map_err(|e| StoreError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(BTreeMap::new());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		let entries: Vec<(String, String)> =
			serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
				message: format!("Failed to parse {}: {e}", path.display()),
			})?;

		Ok(entries.into_iter().collect())
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create vault directory {}: {e}", parent.display()),
			})?;
		}
		Ok(())
	}

	fn persist_locked(&self, contents: &BTreeMap<String, String>) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let snapshot: Vec<_> = contents.iter().collect();
		let serialized =
			serde_json::to_vec_pretty(&snapshot).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize vault snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl TokenVault for FileVault {
	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
		Box::pin(async move { Ok(self.inner.read().get(key).cloned()) })
	}

	fn set<'a>(&'a self, key: &'a str, value: &'a str) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			guard.insert(key.to_owned(), value.to_owned());
			self.persist_locked(&guard)?;

			Ok(())
		})
	}

	fn remove<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			if guard.remove(key).is_some() {
				self.persist_locked(&guard)?;
			}

			Ok(())
		})
	}
}
