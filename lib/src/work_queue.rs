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

//! Work Queue: an append-only log of deferred filesystem mutations that
//! must outlive the database transaction. The core never executes these
//! directly — that is the invariant that lets a rolled-back transaction
//! leave the filesystem untouched.

use std::fs;
use std::io;

use crate::checksum::Checksum;
use crate::pristine::PristineStore;
use crate::repo_path::RelPath;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkItem {
    /// Install pristine content into the working file at `dst`.
    InstallFile {
        dst: RelPath,
        checksum: Checksum,
    },
    /// Write conflict markers to the working file at `dst`.
    WriteConflictMarkers { dst: RelPath, marker_text: String },
}

pub type WorkQueue = Vec<WorkItem>;

/// Executes queued work items against `wc_root`, in order. Called by
/// callers only after the database transaction that produced them has
/// committed — never by the core itself.
pub fn run_work_items(
    wc_root: &std::path::Path,
    pristine: &PristineStore,
    items: &[WorkItem],
) -> io::Result<()> {
    for item in items {
        match item {
            WorkItem::InstallFile { dst, checksum } => {
                let contents = pristine.read_to_vec(checksum)?;
                fs::write(dst.to_abspath(wc_root), contents)?;
            }
            WorkItem::WriteConflictMarkers { dst, marker_text } => {
                fs::write(dst.to_abspath(wc_root), marker_text)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn install_file_writes_pristine_content() {
        let wc_dir = TempDir::new().unwrap();
        let pristine_dir = TempDir::new().unwrap();
        let pristine = PristineStore::open(pristine_dir.path()).unwrap();
        let checksum = pristine.write(b"hello v2\n").unwrap();
        fs::write(wc_dir.path().join("f"), b"hello v1\n").unwrap();

        let items = vec![WorkItem::InstallFile {
            dst: RelPath::from("f"),
            checksum,
        }];
        run_work_items(wc_dir.path(), &pristine, &items).unwrap();

        assert_eq!(fs::read(wc_dir.path().join("f")).unwrap(), b"hello v2\n");
    }
}
