// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! The local-bundle App Source variant. Reads the archive once at
//! construction and serves static snapshots thereafter.
//!
//! Bundle archive *reading* is an external collaborator (out of scope, per
//! `spec.md` §1); `BundleSource::load` treats the bundle path as a JSON
//! manifest of `Application`s as a stand-in for the real archive reader, and
//! `BundleSource::from_applications` is the seam a real reader would call
//! into.

use async_trait::async_trait;
use constd_core::{Application, Runnable};

use crate::source::{AppSource, AppSourceError};

pub struct BundleSource {
    applications: Vec<Application>,
}

impl BundleSource {
    pub fn from_applications(applications: Vec<Application>) -> Self {
        Self { applications }
    }

    pub fn load(path: &std::path::Path) -> Result<Self, AppSourceError> {
        let bytes = std::fs::read(path).map_err(|e| AppSourceError::BundleRead(e.to_string()))?;
        let applications: Vec<Application> =
            serde_json::from_slice(&bytes).map_err(|e| AppSourceError::BundleRead(e.to_string()))?;
        Ok(Self { applications })
    }
}

#[async_trait]
impl AppSource for BundleSource {
    async fn start(&self) -> Result<(), AppSourceError> {
        Ok(())
    }

    async fn applications(&self) -> Vec<Application> {
        self.applications.clone()
    }

    async fn runnables(&self, identifier: &str, app_version: &str) -> Vec<Runnable> {
        self.applications
            .iter()
            .filter(|a| a.identifier == identifier && a.app_version == app_version)
            .flat_map(|a| a.runnables.clone())
            .collect()
    }

    async fn find_runnable(&self, fqfn: &str, _auth_token: &str) -> Result<Runnable, AppSourceError> {
        self.applications
            .iter()
            .flat_map(|a| a.runnables.iter())
            .find(|r| r.fqfn.to_string() == fqfn)
            .cloned()
            .ok_or_else(|| AppSourceError::RunnableNotFound(fqfn.to_string()))
    }
}
