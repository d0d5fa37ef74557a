// Copyright 2020 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A scheme-keyed registry of repository-access backends. No real
//! network transport is implemented here; this models just enough
//! surface for `switch` orchestration to depend on a trait rather than
//! a concrete remote implementation.

use std::collections::HashMap;

use crate::error::{CoreError, CoreResult};

/// What `switch` needs from a repository: the latest revision of a path,
/// and the bytes of a file at a revision.
pub trait RepositoryAccess {
    fn latest_revision(&self) -> CoreResult<i64>;
    fn get_file(&self, path_in_repos: &str, revision: i64) -> CoreResult<Vec<u8>>;
    fn get_dir(&self, path_in_repos: &str, revision: i64) -> CoreResult<Vec<String>>;
}

/// A backend that always reports an empty tree at revision 0. Stands in
/// for a real network backend in environments that never configure one.
pub struct NullRepositoryAccess;

impl RepositoryAccess for NullRepositoryAccess {
    fn latest_revision(&self) -> CoreResult<i64> {
        Ok(0)
    }

    fn get_file(&self, path_in_repos: &str, _revision: i64) -> CoreResult<Vec<u8>> {
        tracing::debug!(path = path_in_repos, "get_file on null backend");
        Err(CoreError::UnsupportedFeature("no repository-access backend configured"))
    }

    fn get_dir(&self, _path_in_repos: &str, _revision: i64) -> CoreResult<Vec<String>> {
        Ok(Vec::new())
    }
}

/// Treats a plain directory tree as a repository at a single fixed
/// revision, for the `file://` scheme. No history, no commits — just
/// enough to exercise `switch` against a local tree without a network
/// stack.
pub struct LocalRepositoryAccess {
    root: std::path::PathBuf,
    revision: i64,
}

impl LocalRepositoryAccess {
    pub fn new(root: impl Into<std::path::PathBuf>, revision: i64) -> Self {
        LocalRepositoryAccess {
            root: root.into(),
            revision,
        }
    }
}

impl RepositoryAccess for LocalRepositoryAccess {
    fn latest_revision(&self) -> CoreResult<i64> {
        Ok(self.revision)
    }

    fn get_file(&self, path_in_repos: &str, _revision: i64) -> CoreResult<Vec<u8>> {
        Ok(std::fs::read(self.root.join(path_in_repos))?)
    }

    fn get_dir(&self, path_in_repos: &str, _revision: i64) -> CoreResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(self.root.join(path_in_repos))? {
            names.push(entry?.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }
}

type BackendFactory = Box<dyn Fn(&str) -> Box<dyn RepositoryAccess> + Send + Sync>;

/// Resolves a URL to a `RepositoryAccess` backend by scheme.
#[derive(Default)]
pub struct RaRegistry {
    factories: HashMap<String, BackendFactory>,
}

impl RaRegistry {
    pub fn new() -> Self {
        RaRegistry {
            factories: HashMap::new(),
        }
    }

    pub fn register(
        &mut self,
        scheme: impl Into<String>,
        factory: impl Fn(&str) -> Box<dyn RepositoryAccess> + Send + Sync + 'static,
    ) {
        self.factories.insert(scheme.into(), Box::new(factory));
    }

    pub fn resolve(&self, url: &str) -> CoreResult<Box<dyn RepositoryAccess>> {
        let scheme = url
            .split_once("://")
            .map(|(scheme, _)| scheme)
            .ok_or_else(|| CoreError::UnsupportedFeature("repository URL has no scheme"))?;
        match self.factories.get(scheme) {
            Some(factory) => Ok(factory(url)),
            None => Err(CoreError::UnsupportedFeature("no backend registered for scheme")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_unregistered_scheme_fails() {
        let registry = RaRegistry::new();
        let result = registry.resolve("svn://example.invalid/repo");
        assert!(matches!(result, Err(CoreError::UnsupportedFeature(_))));
    }

    #[test]
    fn resolve_registered_scheme_invokes_factory() {
        let mut registry = RaRegistry::new();
        registry.register("file", |_url| Box::new(NullRepositoryAccess));
        let backend = registry.resolve("file:///repo").unwrap();
        assert_eq!(backend.latest_revision().unwrap(), 0);
    }
}
