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

//! Error taxonomy. Every variant is fatal for the invocation; a merge
//! conflict is data, not an error, and is never represented here.

use thiserror::Error;

use crate::repo_path::RelPath;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("'{0}' does not exist in the working copy")]
    PathNotFound(RelPath),

    #[error("'{0}' has not been moved away")]
    NotMovedAway(RelPath),

    #[error("'{0}' is not in conflict")]
    NotInConflict(RelPath),

    #[error("'{0}' is not a tree-conflict victim")]
    NotTreeConflicted(RelPath),

    #[error("cannot auto-resolve tree-conflict on '{0}'")]
    UnsupportedOperation(RelPath),

    #[error("'{0}' is not deleted")]
    NotDeleted(RelPath),

    #[error("editor received unsupported callback '{0}'")]
    UnsupportedFeature(&'static str),

    #[error("assertion violated: {0}")]
    AssertionViolation(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Sql(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;
