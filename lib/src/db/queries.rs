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

//! Typed queries against the `nodes` table.

use rusqlite::{params, OptionalExtension};
use tracing::trace;

use super::{NodeKind, NodeRow, WcId};
use crate::checksum::Checksum;
use crate::error::{CoreError, CoreResult};
use crate::repo_path::RelPath;

fn row_to_node(row: &rusqlite::Row) -> rusqlite::Result<NodeRow> {
    Ok(NodeRow {
        wc_id: row.get(0)?,
        relpath: RelPath::from(row.get::<_, String>(1)?),
        op_depth: row.get(2)?,
        parent_relpath: row
            .get::<_, Option<String>>(3)?
            .map(RelPath::from),
        kind: NodeKind::from_str(&row.get::<_, String>(4)?),
        revision: row.get(5)?,
        repos_relpath: row.get(6)?,
        repos_root_url: row.get(7)?,
        repos_uuid: row.get(8)?,
        checksum: row
            .get::<_, Option<String>>(9)?
            .map(Checksum::from_hex),
        moved_to: row.get::<_, Option<String>>(10)?.map(RelPath::from),
    })
}

const COLUMNS: &str = "wc_id, relpath, op_depth, parent_relpath, kind, revision, \
     repos_relpath, repos_root_url, repos_uuid, checksum, moved_to";

/// `STMT_SELECT_NODE_INFO`: all rows for `relpath`, ordered by op_depth
/// ascending. Callers skip the lowest row to get "the layer above BASE".
pub fn select_node_info(
    conn: &rusqlite::Connection,
    wc_id: WcId,
    relpath: &RelPath,
) -> CoreResult<Vec<NodeRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM nodes WHERE wc_id = ?1 AND relpath = ?2 ORDER BY op_depth ASC"
    ))?;
    let rows = stmt
        .query_map(params![wc_id, relpath.as_str()], row_to_node)?
        .collect::<Result<Vec<_>, _>>()?;
    trace!(relpath = %relpath, rows = rows.len(), "select_node_info");
    Ok(rows)
}

/// `STMT_SELECT_WORKING_NODE`: rows with `op_depth > 0`, used for shadowing
/// checks.
pub fn select_working_node(
    conn: &rusqlite::Connection,
    wc_id: WcId,
    relpath: &RelPath,
) -> CoreResult<Vec<NodeRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM nodes WHERE wc_id = ?1 AND relpath = ?2 AND op_depth > 0 \
         ORDER BY op_depth ASC"
    ))?;
    let rows = stmt
        .query_map(params![wc_id, relpath.as_str()], row_to_node)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Returns whether any row above `above_op_depth` shadows `relpath` (spec
/// §4.2 step 4: "any row ... with op_depth > depth(move_root_dst_relpath)").
pub fn is_shadowed_above(
    conn: &rusqlite::Connection,
    wc_id: WcId,
    relpath: &RelPath,
    above_op_depth: i64,
) -> CoreResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM nodes WHERE wc_id = ?1 AND relpath = ?2 AND op_depth > ?3",
        params![wc_id, relpath.as_str(), above_op_depth],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// `DepthGetInfo`: the row at the specific `op_depth`. Fails if absent.
pub fn depth_get_info(
    conn: &rusqlite::Connection,
    wc_id: WcId,
    relpath: &RelPath,
    op_depth: i64,
) -> CoreResult<NodeRow> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM nodes WHERE wc_id = ?1 AND relpath = ?2 AND op_depth = ?3"),
        params![wc_id, relpath.as_str(), op_depth],
        row_to_node,
    )
    .optional()?
    .ok_or_else(|| CoreError::PathNotFound(relpath.clone()))
}

/// `BaseGetInfo`: reads op_depth 0.
pub fn base_get_info(
    conn: &rusqlite::Connection,
    wc_id: WcId,
    relpath: &RelPath,
) -> CoreResult<NodeRow> {
    depth_get_info(conn, wc_id, relpath, 0)
}

/// `BaseGetChildren`: ordered list of child names at op_depth 0.
pub fn base_get_children(
    conn: &rusqlite::Connection,
    wc_id: WcId,
    parent_relpath: &RelPath,
) -> CoreResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT relpath FROM nodes WHERE wc_id = ?1 AND parent_relpath = ?2 AND op_depth = 0 \
         ORDER BY relpath ASC",
    )?;
    let names = stmt
        .query_map(params![wc_id, parent_relpath.as_str()], |row| {
            row.get::<_, String>(0)
        })?
        .collect::<Result<Vec<_>, _>>()?;
    let names = names
        .into_iter()
        .map(|full| {
            RelPath::from(full)
                .basename()
                .expect("child relpath has a basename")
                .to_owned()
        })
        .collect();
    Ok(names)
}

/// Resolution of [`scan_deletion`]: either not deleted, or the relpath's
/// move destination plus the op-root relpath that recorded the move.
#[derive(Debug, Clone)]
pub struct Deletion {
    pub moved_to_relpath: RelPath,
    pub move_op_root_relpath: RelPath,
}

/// `ScanDeletion`: resolves `relpath`'s BASE row's `moved_to`, and walks up
/// from the destination to find the op-root that recorded the move (the
/// shallowest op_depth > 0 ancestor-or-self row of the destination).
pub fn scan_deletion(
    conn: &rusqlite::Connection,
    wc_id: WcId,
    relpath: &RelPath,
) -> CoreResult<Option<Deletion>> {
    let base = match base_get_info(conn, wc_id, relpath) {
        Ok(row) => row,
        Err(CoreError::PathNotFound(_)) => return Ok(None),
        Err(e) => return Err(e),
    };
    let Some(moved_to) = base.moved_to else {
        return Ok(None);
    };
    // The shallowest op_depth > 0 row is the move-here layer itself; a
    // deeper row would be a later local change shadowing the destination,
    // not the move this deletion belongs to.
    let dst_rows = select_node_info(conn, wc_id, &moved_to)?;
    let op_depth = dst_rows
        .iter()
        .find(|r| r.op_depth > 0)
        .map(|r| r.op_depth)
        .unwrap_or(moved_to.depth() as i64);
    let move_op_root_relpath = moved_to.ancestor(op_depth as usize);
    Ok(Some(Deletion {
        moved_to_relpath: moved_to,
        move_op_root_relpath,
    }))
}

/// `STMT_DELETE_WORKING_OP_DEPTH`: removes the subtree rooted at `relpath`
/// whose rows carry exactly `op_depth`.
pub fn delete_working_op_depth(
    conn: &rusqlite::Connection,
    wc_id: WcId,
    relpath: &RelPath,
    op_depth: i64,
) -> CoreResult<()> {
    let prefix = format!("{}/", relpath.as_str());
    conn.execute(
        "DELETE FROM nodes WHERE wc_id = ?1 AND op_depth = ?2 \
         AND (relpath = ?3 OR relpath LIKE ?4 ESCAPE '\\')",
        params![wc_id, op_depth, relpath.as_str(), like_prefix(&prefix)],
    )?;
    Ok(())
}

fn like_prefix(prefix: &str) -> String {
    // Escape SQL LIKE metacharacters in path components before appending '%'.
    format!("{}%", prefix.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_"))
}

/// `STMT_SELECT_LOCAL_RELPATH_OP_DEPTH`: ancestor-first list of descendant
/// relpaths (including `relpath` itself) at `op_depth`.
pub fn select_local_relpath_op_depth(
    conn: &rusqlite::Connection,
    wc_id: WcId,
    relpath: &RelPath,
    op_depth: i64,
) -> CoreResult<Vec<NodeRow>> {
    let prefix = format!("{}/", relpath.as_str());
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM nodes WHERE wc_id = ?1 AND op_depth = ?2 \
         AND (relpath = ?3 OR relpath LIKE ?4 ESCAPE '\\') \
         ORDER BY LENGTH(relpath) ASC, relpath ASC"
    ))?;
    let rows = stmt
        .query_map(
            params![wc_id, op_depth, relpath.as_str(), like_prefix(&prefix)],
            row_to_node,
        )?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// `STMT_COPY_NODE_MOVE`: inserts a copy of the source row at the
/// destination coordinates, rewriting `parent_relpath`.
pub fn copy_node_move(
    conn: &rusqlite::Connection,
    wc_id: WcId,
    src_relpath: &RelPath,
    src_op_depth: i64,
    dst_relpath: &RelPath,
    dst_op_depth: i64,
    dst_parent_relpath: &RelPath,
) -> CoreResult<()> {
    let src = depth_get_info(conn, wc_id, src_relpath, src_op_depth)?;
    upsert_node(
        conn,
        &NodeRow {
            wc_id,
            relpath: dst_relpath.clone(),
            op_depth: dst_op_depth,
            parent_relpath: Some(dst_parent_relpath.clone()),
            kind: src.kind,
            revision: src.revision,
            repos_relpath: src.repos_relpath,
            repos_root_url: src.repos_root_url,
            repos_uuid: src.repos_uuid,
            checksum: src.checksum,
            moved_to: None,
        },
    )
}

/// Inserts or replaces a node row. Needed by anything that populates
/// BASE rows from an incoming update, and by test fixtures.
pub fn upsert_node(conn: &rusqlite::Connection, row: &NodeRow) -> CoreResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO nodes \
         (wc_id, relpath, op_depth, parent_relpath, kind, revision, \
          repos_relpath, repos_root_url, repos_uuid, checksum, moved_to) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            row.wc_id,
            row.relpath.as_str(),
            row.op_depth,
            row.parent_relpath.as_ref().map(RelPath::as_str),
            row.kind.as_str(),
            row.revision,
            row.repos_relpath,
            row.repos_root_url,
            row.repos_uuid,
            row.checksum.as_ref().map(Checksum::hex),
            row.moved_to.as_ref().map(RelPath::as_str),
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::WCRoot;

    fn base_row(wc_id: WcId, relpath: &str, parent: &str, checksum: &str, rev: i64) -> NodeRow {
        NodeRow {
            wc_id,
            relpath: RelPath::from(relpath),
            op_depth: 0,
            parent_relpath: Some(RelPath::from(parent)),
            kind: NodeKind::File,
            revision: Some(rev),
            repos_relpath: Some(relpath.to_owned()),
            repos_root_url: Some("file:///repo".to_owned()),
            repos_uuid: Some("uuid-1".to_owned()),
            checksum: Some(Checksum::from_hex(checksum)),
            moved_to: None,
        }
    }

    #[test]
    fn scan_deletion_follows_moved_to() {
        let root = WCRoot::open_in_memory("/wc", 1).unwrap();
        let conn = root.connection();
        let mut src = base_row(1, "a/f", "a", "X", 5);
        src.moved_to = Some(RelPath::from("b/f"));
        upsert_node(conn, &src).unwrap();
        upsert_node(
            conn,
            &NodeRow {
                op_depth: 1,
                ..base_row(1, "b/f", "b", "X", 5)
            },
        )
        .unwrap();

        let deletion = scan_deletion(conn, 1, &RelPath::from("a/f")).unwrap().unwrap();
        assert_eq!(deletion.moved_to_relpath, RelPath::from("b/f"));
        // "b/f" carries op_depth 1, so the move root is the first path
        // segment: the directory "b" that the move introduced.
        assert_eq!(deletion.move_op_root_relpath, RelPath::from("b"));
    }

    #[test]
    fn delete_working_op_depth_removes_subtree_only_at_depth() {
        let root = WCRoot::open_in_memory("/wc", 1).unwrap();
        let conn = root.connection();
        upsert_node(conn, &base_row(1, "b", "", "X", 5)).unwrap();
        upsert_node(
            conn,
            &NodeRow {
                op_depth: 1,
                ..base_row(1, "b", "", "X", 5)
            },
        )
        .unwrap();
        upsert_node(
            conn,
            &NodeRow {
                op_depth: 1,
                ..base_row(1, "b/f", "b", "X", 5)
            },
        )
        .unwrap();

        delete_working_op_depth(conn, 1, &RelPath::from("b"), 1).unwrap();

        assert!(select_node_info(conn, 1, &RelPath::from("b/f"))
            .unwrap()
            .is_empty());
        // BASE row untouched.
        assert_eq!(select_node_info(conn, 1, &RelPath::from("b")).unwrap().len(), 1);
    }
}
