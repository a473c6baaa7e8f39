// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! The Process Descriptor Store: on-disk `{port, job_type}` files keyed by
//! instance UUID, under a well-known directory. Existence is a liveness
//! token; deletion is the termination signal.

use std::io;
use std::path::{Path, PathBuf};

use constd_wire::ProcessDescriptor;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("descriptor already exists for {0}")]
    DescriptorExists(Uuid),
    #[error("descriptor missing for {0}")]
    DescriptorMissing(Uuid),
    #[error("descriptor io error: {0}")]
    Io(#[from] io::Error),
    #[error("descriptor content was not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Default well-known sub-namespace: `$TMPDIR/constd`.
pub fn default_store_dir() -> PathBuf {
    std::env::temp_dir().join("constd")
}

#[derive(Debug, Clone)]
pub struct DescriptorStore {
    dir: PathBuf,
}

impl DescriptorStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn at_default_location() -> Self {
        Self::new(default_store_dir())
    }

    fn path_for(&self, uuid: &Uuid) -> PathBuf {
        self.dir.join(format!("{uuid}.json"))
    }

    /// Atomically create the descriptor file. Fails `DescriptorExists` if a
    /// descriptor already exists for this UUID (e.g. a UUID collision).
    pub fn write(&self, uuid: &Uuid, descriptor: &ProcessDescriptor) -> Result<(), DescriptorError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(uuid);

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => DescriptorError::DescriptorExists(*uuid),
                _ => DescriptorError::Io(e),
            })?;

        use std::io::Write;
        let body = serde_json::to_vec(descriptor)?;
        file.write_all(&body)?;
        Ok(())
    }

    /// Read the descriptor. Fails `DescriptorMissing` if absent.
    pub fn find(&self, uuid: &Uuid) -> Result<ProcessDescriptor, DescriptorError> {
        let path = self.path_for(uuid);
        let body = std::fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => DescriptorError::DescriptorMissing(*uuid),
            _ => DescriptorError::Io(e),
        })?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Remove the descriptor file. Idempotent: removing an already-absent
    /// descriptor is not an error.
    pub fn delete(&self, uuid: &Uuid) -> Result<(), DescriptorError> {
        let path = self.path_for(uuid);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DescriptorError::Io(e)),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
