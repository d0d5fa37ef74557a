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

//! Content-addressed blob store keyed by [`Checksum`]. Immutable once
//! written; garbage collection is out of scope for the core.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::checksum::Checksum;

const DEFAULT_SHARD_WIDTH: usize = 2;

#[derive(Debug)]
pub struct PristineStore {
    root: PathBuf,
    shard_width: usize,
}

impl PristineStore {
    /// Opens (creating if needed) a pristine store rooted at `root`, sharded
    /// by the default width.
    pub fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        Self::open_with_shard_width(root, DEFAULT_SHARD_WIDTH)
    }

    /// Opens (creating if needed) a pristine store rooted at `root`, sharded
    /// by `shard_width` leading hex characters of each blob's checksum.
    pub fn open_with_shard_width(root: impl Into<PathBuf>, shard_width: usize) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(PristineStore { root, shard_width })
    }

    /// Resolves `checksum` to the absolute path of its blob, sharded by
    /// its leading hex characters to keep any one directory small.
    pub fn path(&self, checksum: &Checksum) -> PathBuf {
        let hex = checksum.hex();
        let shard = &hex[..hex.len().min(self.shard_width)];
        self.root.join(shard).join(hex)
    }

    pub fn contains(&self, checksum: &Checksum) -> bool {
        self.path(checksum).is_file()
    }

    pub fn read(&self, checksum: &Checksum) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(fs::File::open(self.path(checksum))?))
    }

    pub fn read_to_vec(&self, checksum: &Checksum) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.read(checksum)?.read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Inserts `contents`, returning its checksum. Idempotent: writing the
    /// same bytes twice is a no-op the second time.
    pub fn write(&self, contents: &[u8]) -> io::Result<Checksum> {
        let checksum = Checksum::of_bytes(contents);
        let dst = self.path(&checksum);
        if dst.is_file() {
            return Ok(checksum);
        }
        fs::create_dir_all(dst.parent().unwrap())?;
        let tmp = dst.with_extension("tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &dst)?;
        Ok(checksum)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
