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

//! Forward-slash paths relative to a `WCRoot`.

use std::fmt;
use std::path::{Path, PathBuf};

/// A path relative to a `WCRoot`, forward-slash separated. The empty string
/// names the root itself (depth 0).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelPath(String);

impl RelPath {
    pub fn root() -> Self {
        RelPath(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of path segments; 0 for the root.
    pub fn depth(&self) -> usize {
        if self.is_root() {
            0
        } else {
            self.0.split('/').count()
        }
    }

    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    pub fn parent(&self) -> Option<RelPath> {
        if self.is_root() {
            return None;
        }
        match self.0.rsplit_once('/') {
            Some((parent, _)) => Some(RelPath(parent.to_owned())),
            None => Some(RelPath::root()),
        }
    }

    pub fn basename(&self) -> Option<&str> {
        if self.is_root() {
            None
        } else {
            Some(self.0.rsplit('/').next().unwrap())
        }
    }

    /// The ancestor of `self` with exactly `depth` path segments. `depth`
    /// must not exceed `self.depth()`.
    pub fn ancestor(&self, depth: usize) -> RelPath {
        if depth == 0 {
            return RelPath::root();
        }
        assert!(depth <= self.depth(), "ancestor depth exceeds path depth");
        let prefix: Vec<&str> = self.0.split('/').take(depth).collect();
        RelPath(prefix.join("/"))
    }

    pub fn join(&self, component: &str) -> RelPath {
        assert!(!component.contains('/'), "component must not contain '/'");
        if self.is_root() {
            RelPath(component.to_owned())
        } else {
            RelPath(format!("{}/{}", self.0, component))
        }
    }

    /// Re-root a descendant of `self` onto `new_base`, e.g. stripping
    /// `a` from `a/x/y` and prefixing `b` gives `b/x/y`. Used by the Layer
    /// Replacer to translate source op-depth rows onto the destination.
    pub fn rebase(&self, old_base: &RelPath, new_base: &RelPath) -> RelPath {
        if self == old_base {
            return new_base.clone();
        }
        let suffix = self
            .0
            .strip_prefix(old_base.0.as_str())
            .and_then(|s| s.strip_prefix('/'))
            .unwrap_or_else(|| panic!("{self:?} is not a descendant of {old_base:?}"));
        if new_base.is_root() {
            RelPath(suffix.to_owned())
        } else {
            RelPath(format!("{}/{}", new_base.0, suffix))
        }
    }

    pub fn to_abspath(&self, wc_root: &Path) -> PathBuf {
        wc_root.join(&self.0)
    }
}

impl From<&str> for RelPath {
    fn from(value: &str) -> Self {
        RelPath(value.trim_matches('/').to_owned())
    }
}

impl From<String> for RelPath {
    fn from(value: String) -> Self {
        RelPath::from(value.as_str())
    }
}

impl fmt::Display for RelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str(".")
        } else {
            f.write_str(&self.0)
        }
    }
}

impl fmt::Debug for RelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RelPath({:?})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth() {
        assert_eq!(RelPath::root().depth(), 0);
        assert_eq!(RelPath::from("a").depth(), 1);
        assert_eq!(RelPath::from("a/b/c").depth(), 3);
    }

    #[test]
    fn parent_and_basename() {
        let p = RelPath::from("a/b/c");
        assert_eq!(p.parent(), Some(RelPath::from("a/b")));
        assert_eq!(p.basename(), Some("c"));
        assert_eq!(RelPath::root().parent(), None);
    }

    #[test]
    fn rebase_descendant() {
        let src = RelPath::from("a");
        let dst = RelPath::from("b");
        let child = RelPath::from("a/x/y");
        assert_eq!(child.rebase(&src, &dst), RelPath::from("b/x/y"));
        assert_eq!(src.rebase(&src, &dst), dst);
    }
}
