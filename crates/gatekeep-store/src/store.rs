//! The credential store: one secret per identity, set once, kept on disk.
//!
//! The whole file is read at startup and the whole file is rewritten on
//! every successful [`CredentialStore::set`].
//!
//! # Durability gap
//!
//! When the flush after a `set` fails, the new record stays in memory and
//! `set` returns [`StoreError::Flush`]. Until some later flush succeeds,
//! the process and the file disagree: the account can log in now but the
//! credential is gone after a restart.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use gatekeep_protocol::Identity;

use crate::StoreError;
use crate::properties;

/// Header written at the top of the credential file.
const FILE_HEADER: &str = "Player Passwords";

/// Define-once credential records, backed by a `.properties` file.
///
/// Keys are kept as the identity's text form rather than parsed
/// [`Identity`] values, so entries this build doesn't recognise survive
/// a rewrite instead of being silently dropped.
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
    /// `BTreeMap` so the rewritten file has a stable line order.
    records: BTreeMap<String, String>,
}

impl CredentialStore {
    /// Creates an empty store that will flush to `path`. Nothing is read
    /// or written until the first `set`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: BTreeMap::new(),
        }
    }

    /// Loads the store from `path`, never failing.
    ///
    /// A missing file is the normal first-run case and yields an empty
    /// store. Any other read or parse problem is logged and also yields
    /// an empty store: a broken credential file must not keep the server
    /// from starting.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::try_load(&path) {
            Ok(store) => store,
            Err(e) => {
                tracing::error!(
                    path = %path.display(),
                    error = %e,
                    "failed to load credential file, starting with an empty store"
                );
                Self::empty(path)
            }
        }
    }

    /// Loads the store from `path`, reporting failures.
    ///
    /// A missing file still counts as success (empty store).
    ///
    /// # Errors
    /// - [`StoreError::Read`] if the file exists but can't be read.
    /// - [`StoreError::MalformedEscape`] if it isn't valid `.properties` text.
    pub fn try_load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(
                    path = %path.display(),
                    "no credential file yet, starting empty"
                );
                return Ok(Self::empty(path));
            }
            Err(source) => return Err(StoreError::Read { path, source }),
        };

        let mut records = BTreeMap::new();
        for (key, secret) in properties::parse(&text)? {
            if key.parse::<Identity>().is_err() {
                tracing::warn!(%key, "credential entry key is not an identity, keeping it as-is");
            }
            // Later duplicates win.
            records.insert(key, secret);
        }

        tracing::info!(
            path = %path.display(),
            records = records.len(),
            "credential file loaded"
        );
        Ok(Self { path, records })
    }

    /// Returns `true` if `identity` already has a credential.
    pub fn has(&self, identity: Identity) -> bool {
        self.records.contains_key(&identity.to_string())
    }

    /// Stores the first and only credential for `identity`, then flushes.
    ///
    /// # Errors
    /// - [`StoreError::AlreadySet`] if a credential exists. Nothing changes.
    /// - [`StoreError::Flush`] if the file couldn't be written. The record
    ///   is kept in memory anyway (see the module docs).
    pub fn set(&mut self, identity: Identity, secret: &str) -> Result<(), StoreError> {
        let key = identity.to_string();
        if self.records.contains_key(&key) {
            return Err(StoreError::AlreadySet(identity));
        }

        self.records.insert(key, secret.to_owned());
        tracing::debug!(%identity, "credential recorded, flushing");
        self.flush()
    }

    /// Returns `true` if `identity` has a credential equal to `secret`.
    ///
    /// Plain string equality, not constant-time; secrets are stored as-is.
    pub fn verify(&self, identity: Identity, secret: &str) -> bool {
        self.records
            .get(&identity.to_string())
            .is_some_and(|stored| stored == secret)
    }

    /// Rewrites the whole file from memory.
    ///
    /// # Errors
    /// Returns [`StoreError::Flush`] if the write fails.
    pub fn flush(&self) -> Result<(), StoreError> {
        let text = properties::render(
            FILE_HEADER,
            self.records.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        );
        fs::write(&self.path, text).map_err(|source| StoreError::Flush {
            path: self.path.clone(),
            source,
        })
    }

    /// The file this store reads from and flushes to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of stored credentials.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no credentials are stored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
