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

//! The delta editor's capability set. Modeled as a Rust trait rather than
//! a struct of function pointers: each callback has a default
//! implementation that fails with [`CoreError::UnsupportedFeature`], a
//! first-class failure kind rather than a placeholder. Only
//! [`TreeConflictReceiver`](crate::receiver) in this crate overrides
//! `alter_file`/`complete`/`abort`.

use crate::checksum::Checksum;
use crate::error::{CoreError, CoreResult};
use crate::repo_path::RelPath;

fn unsupported(name: &'static str) -> CoreError {
    CoreError::UnsupportedFeature(name)
}

pub trait TreeConflictEditor {
    fn add_directory(&mut self, _relpath: &RelPath) -> CoreResult<()> {
        Err(unsupported("add_directory"))
    }

    fn add_file(&mut self, _relpath: &RelPath) -> CoreResult<()> {
        Err(unsupported("add_file"))
    }

    fn add_symlink(&mut self, _relpath: &RelPath) -> CoreResult<()> {
        Err(unsupported("add_symlink"))
    }

    fn add_absent(&mut self, _relpath: &RelPath) -> CoreResult<()> {
        Err(unsupported("add_absent"))
    }

    fn alter_directory(&mut self, _relpath: &RelPath) -> CoreResult<()> {
        Err(unsupported("alter_directory"))
    }

    /// The one callback that does real work — see the Update-Working-File
    /// algorithm in [`crate::receiver`].
    fn alter_file(
        &mut self,
        dst_relpath: &RelPath,
        expected_dst_revision: i64,
        props: Option<()>,
        src_checksum: &Checksum,
        post_update_contents: &[u8],
    ) -> CoreResult<()>;

    fn alter_symlink(&mut self, _relpath: &RelPath) -> CoreResult<()> {
        Err(unsupported("alter_symlink"))
    }

    fn delete(&mut self, _relpath: &RelPath) -> CoreResult<()> {
        Err(unsupported("delete"))
    }

    fn copy(&mut self, _src_relpath: &RelPath, _dst_relpath: &RelPath) -> CoreResult<()> {
        Err(unsupported("copy"))
    }

    fn move_node(&mut self, _src_relpath: &RelPath, _dst_relpath: &RelPath) -> CoreResult<()> {
        Err(unsupported("move"))
    }

    fn rotate(&mut self, _relpaths: &[RelPath]) -> CoreResult<()> {
        Err(unsupported("rotate"))
    }

    fn complete(&mut self) -> CoreResult<()>;

    fn abort(&mut self) -> CoreResult<()>;
}
