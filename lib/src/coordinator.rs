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

//! The Coordinator: the public entry point. Reads the tree-conflict
//! record, resolves the move pair, opens a database transaction, runs the
//! Edit Driver then the Layer Replacer, and returns queued work items.

use tracing::{info, instrument};

use crate::cancel::CancelProbe;
use crate::conflict::{self, ConflictVersion, VersionNodeKind};
use crate::db::{queries, NodeKind, WCRoot};
use crate::driver;
use crate::error::{CoreError, CoreResult};
use crate::layer_replace;
use crate::notify::NotifySink;
use crate::pristine::PristineStore;
use crate::receiver::TreeConflictReceiver;
use crate::repo_path::RelPath;
use crate::work_queue::WorkQueue;

/// Resolves a single move-vs-update tree conflict at `victim_relpath`.
#[instrument(skip(wc_root, pristine, notify, cancel))]
#[allow(clippy::too_many_arguments)]
pub fn update_moved_away_conflict_victim(
    wc_root: &mut WCRoot,
    pristine: &PristineStore,
    victim_relpath: &RelPath,
    notify: &mut dyn NotifySink,
    cancel: &dyn CancelProbe,
    marker_banner_width: usize,
) -> CoreResult<WorkQueue> {
    let wc_id = wc_root.wc_id();
    let wc_abspath = wc_root.abspath().to_path_buf();
    let mut work_items = WorkQueue::new();

    wc_root.with_transaction(|tx| {
        // Step 1: read the conflict record.
        let skel = conflict::require_tree_conflict(tx, wc_id, victim_relpath)?;
        let (operation, old_location, new_location, _tree_conflicted) =
            conflict::conflict_read_info(&skel);
        let (local_change, incoming_change) = conflict::conflict_read_tree_conflict(&skel);

        let old_version = old_location.clone();
        let new_version = match new_location {
            Some(v) => v.clone(),
            None => synthesize_new_version(tx, wc_id, victim_relpath)?,
        };

        // Step 3: resolve the move pair.
        let deletion = queries::scan_deletion(tx, wc_id, victim_relpath)?
            .ok_or_else(|| CoreError::NotMovedAway(victim_relpath.clone()))?;
        let move_root_src_relpath = victim_relpath.clone();
        let move_root_dst_relpath = deletion.move_op_root_relpath;

        info!(
            victim = %victim_relpath,
            src = %move_root_src_relpath,
            dst = %move_root_dst_relpath,
            "resolving move-vs-update tree conflict"
        );

        let mut receiver = TreeConflictReceiver {
            wc_id,
            wc_abspath: &wc_abspath,
            conn: tx,
            pristine,
            move_root_src_relpath: move_root_src_relpath.clone(),
            move_root_dst_relpath: move_root_dst_relpath.clone(),
            old_version,
            new_version,
            marker_banner_width,
            work_items: &mut work_items,
            notify,
        };

        driver::drive(
            &mut receiver,
            tx,
            wc_id,
            pristine,
            &move_root_src_relpath,
            &move_root_dst_relpath,
            &move_root_dst_relpath,
            operation,
            local_change,
            incoming_change,
            cancel,
        )?;

        layer_replace::replace_layer(tx, wc_id, &move_root_src_relpath, &move_root_dst_relpath)?;

        Ok(())
    })?;

    info!(work_items = work_items.len(), "resolution complete");
    Ok(work_items)
}

/// When the conflict skeleton carries only one location, synthesize the
/// "new version" from the victim's current BASE row.
fn synthesize_new_version(
    conn: &rusqlite::Connection,
    wc_id: crate::db::WcId,
    victim_relpath: &RelPath,
) -> CoreResult<ConflictVersion> {
    let base = queries::base_get_info(conn, wc_id, victim_relpath)?;
    Ok(ConflictVersion {
        repos_root_url: base.repos_root_url.unwrap_or_default(),
        repos_uuid: base.repos_uuid.unwrap_or_default(),
        path_in_repos: base.repos_relpath.unwrap_or_default(),
        peg_rev: base.revision.unwrap_or_default(),
        node_kind: match base.kind {
            NodeKind::Directory => VersionNodeKind::Directory,
            _ => VersionNodeKind::File,
        },
    })
}
