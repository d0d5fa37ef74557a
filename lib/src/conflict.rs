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

//! Conflict Store: structured conflict records attached to a victim path,
//! persisted as JSON. Protobuf-style codegen is out of scope for this
//! core, so skeletons round-trip through `serde_json` rather than a
//! bespoke wire format.

use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::db::WcId;
use crate::error::{CoreError, CoreResult};
use crate::repo_path::RelPath;
use crate::work_queue::WorkItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationKind {
    Update,
    Switch,
    Merge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocalChange {
    Edited,
    Deleted,
    Missing,
    MovedAway,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncomingChange {
    Edit,
    Delete,
    Add,
    Replace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VersionNodeKind {
    File,
    Directory,
}

/// One of the two conflict "sides" (old/new), with repository coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictVersion {
    pub repos_root_url: String,
    pub repos_uuid: String,
    pub path_in_repos: String,
    pub peg_rev: i64,
    pub node_kind: VersionNodeKind,
}

/// A structured conflict record attached to a victim relpath.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictSkeleton {
    pub operation: OperationKind,
    pub local_change: LocalChange,
    pub incoming_change: IncomingChange,
    pub tree_conflicted: bool,
    pub old_version: ConflictVersion,
    pub new_version: Option<ConflictVersion>,
    /// Set by [`conflict_skel_set_op_update`] once a text-level merge has
    /// resolved to a conflict; names the pre-image the markers were cut
    /// from.
    pub original_version: Option<ConflictVersion>,
}

/// `conflict_read_info`: operation, locations, and tree-conflict flag.
pub fn conflict_read_info(
    skel: &ConflictSkeleton,
) -> (OperationKind, &ConflictVersion, Option<&ConflictVersion>, bool) {
    (
        skel.operation,
        &skel.old_version,
        skel.new_version.as_ref(),
        skel.tree_conflicted,
    )
}

/// `conflict_read_tree_conflict`: local/incoming change pair.
pub fn conflict_read_tree_conflict(skel: &ConflictSkeleton) -> (LocalChange, IncomingChange) {
    (skel.local_change, skel.incoming_change)
}

/// `conflict_skel_set_op_update`: stamps the skeleton with op=update and an
/// original version.
pub fn conflict_skel_set_op_update(skel: &mut ConflictSkeleton, original_version: ConflictVersion) {
    skel.operation = OperationKind::Update;
    skel.original_version = Some(original_version);
}

/// `conflict_create_markers`: queues a work item that will write conflict
/// markers for `victim` to disk.
pub fn conflict_create_markers(victim: &RelPath, marker_text: String) -> WorkItem {
    WorkItem::WriteConflictMarkers {
        dst: victim.clone(),
        marker_text,
    }
}

/// Reads the conflict skeleton attached to `relpath`, if any.
pub fn read_conflict(
    conn: &rusqlite::Connection,
    wc_id: WcId,
    relpath: &RelPath,
) -> CoreResult<Option<ConflictSkeleton>> {
    let json: Option<String> = conn
        .query_row(
            "SELECT skeleton_json FROM conflict_skeletons WHERE wc_id = ?1 AND relpath = ?2",
            params![wc_id, relpath.as_str()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(match json {
        Some(json) => Some(serde_json::from_str(&json).map_err(|e| {
            CoreError::AssertionViolation(format!("corrupt conflict skeleton: {e}"))
        })?),
        None => None,
    })
}

/// Writes (or replaces) the conflict skeleton attached to `relpath`.
pub fn write_conflict(
    conn: &rusqlite::Connection,
    wc_id: WcId,
    relpath: &RelPath,
    skel: &ConflictSkeleton,
) -> CoreResult<()> {
    let json = serde_json::to_string(skel)
        .map_err(|e| CoreError::AssertionViolation(format!("cannot serialize skeleton: {e}")))?;
    conn.execute(
        "INSERT OR REPLACE INTO conflict_skeletons (wc_id, relpath, skeleton_json) \
         VALUES (?1, ?2, ?3)",
        params![wc_id, relpath.as_str(), json],
    )?;
    Ok(())
}

/// Lists every relpath currently carrying an unresolved tree conflict,
/// for callers (e.g. `switch`) that crawl a working copy looking for
/// victims rather than being handed one.
pub fn list_tree_conflict_victims(
    conn: &rusqlite::Connection,
    wc_id: WcId,
) -> CoreResult<Vec<RelPath>> {
    let mut stmt =
        conn.prepare("SELECT relpath, skeleton_json FROM conflict_skeletons WHERE wc_id = ?1")?;
    let rows = stmt
        .query_map(params![wc_id], |row| {
            let relpath: String = row.get(0)?;
            let json: String = row.get(1)?;
            Ok((relpath, json))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut victims = Vec::new();
    for (relpath, json) in rows {
        let skel: ConflictSkeleton = serde_json::from_str(&json)
            .map_err(|e| CoreError::AssertionViolation(format!("corrupt conflict skeleton: {e}")))?;
        if skel.tree_conflicted {
            victims.push(RelPath::from(relpath));
        }
    }
    Ok(victims)
}

/// Requires `relpath` to carry a tree conflict, failing with a distinct
/// error for "not in conflict at all" versus "in conflict but not a tree
/// conflict".
pub fn require_tree_conflict(
    conn: &rusqlite::Connection,
    wc_id: WcId,
    relpath: &RelPath,
) -> CoreResult<ConflictSkeleton> {
    let skel = read_conflict(conn, wc_id, relpath)?
        .ok_or_else(|| CoreError::NotInConflict(relpath.clone()))?;
    if !skel.tree_conflicted {
        return Err(CoreError::NotTreeConflicted(relpath.clone()));
    }
    Ok(skel)
}
