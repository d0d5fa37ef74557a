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

//! The Working-Copy Store: a `WCRoot` anchors an absolute base directory
//! and owns one SQLite database recording node rows at multiple
//! operation depths.

pub mod queries;
mod schema;

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::error::CoreResult;

pub type WcId = i64;

/// One row of the `nodes` table, keyed by `(wc_id, relpath, op_depth)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Directory,
    Symlink,
    Absent,
    Unknown,
}

impl NodeKind {
    fn as_str(&self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Directory => "directory",
            NodeKind::Symlink => "symlink",
            NodeKind::Absent => "absent",
            NodeKind::Unknown => "unknown",
        }
    }

    fn from_str(s: &str) -> Self {
        match s {
            "file" => NodeKind::File,
            "directory" => NodeKind::Directory,
            "symlink" => NodeKind::Symlink,
            "absent" => NodeKind::Absent,
            _ => NodeKind::Unknown,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NodeRow {
    pub wc_id: WcId,
    pub relpath: crate::repo_path::RelPath,
    pub op_depth: i64,
    pub parent_relpath: Option<crate::repo_path::RelPath>,
    pub kind: NodeKind,
    pub revision: Option<i64>,
    pub repos_relpath: Option<String>,
    pub repos_root_url: Option<String>,
    pub repos_uuid: Option<String>,
    pub checksum: Option<crate::checksum::Checksum>,
    pub moved_to: Option<crate::repo_path::RelPath>,
}

/// Anchors an absolute base directory and owns one SQLite database.
/// Opened once per process invocation and reused; closed on drop.
#[derive(Debug)]
pub struct WCRoot {
    wc_id: WcId,
    abspath: PathBuf,
    conn: Connection,
}

impl WCRoot {
    /// Opens (creating the schema if absent) the node database at
    /// `abspath/.wc.db`, the way a real working-copy library keeps its
    /// metadata store alongside the tree it describes.
    pub fn open(abspath: impl Into<PathBuf>, wc_id: WcId) -> CoreResult<Self> {
        let abspath = abspath.into();
        let db_path = abspath.join(".wc.db");
        let conn = Connection::open(db_path)?;
        schema::create_schema_if_absent(&conn)?;
        Ok(WCRoot {
            wc_id,
            abspath,
            conn,
        })
    }

    /// In-memory `WCRoot`, for unit tests that don't need a real working
    /// directory on disk.
    pub fn open_in_memory(abspath: impl Into<PathBuf>, wc_id: WcId) -> CoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        schema::create_schema_if_absent(&conn)?;
        Ok(WCRoot {
            wc_id,
            abspath: abspath.into(),
            conn,
        })
    }

    pub fn wc_id(&self) -> WcId {
        self.wc_id
    }

    pub fn abspath(&self) -> &Path {
        &self.abspath
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Runs `f` inside a single transaction scoped to the whole operation.
    /// Rolled back automatically if `f` returns `Err`.
    pub fn with_transaction<T>(
        &mut self,
        f: impl FnOnce(&rusqlite::Transaction) -> CoreResult<T>,
    ) -> CoreResult<T> {
        let txn = self.conn.transaction()?;
        let result = f(&txn)?;
        txn.commit()?;
        Ok(result)
    }
}
