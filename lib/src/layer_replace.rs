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

//! The Layer Replacer: after the editor has applied changes to the
//! working files, rewrites the destination's op-depth layer so its base
//! matches the post-update source.

use tracing::instrument;

use crate::db::{queries, WcId};
use crate::error::{CoreError, CoreResult};
use crate::repo_path::RelPath;

#[instrument(skip(conn))]
pub fn replace_layer(
    conn: &rusqlite::Transaction,
    wc_id: WcId,
    move_root_src_relpath: &RelPath,
    move_root_dst_relpath: &RelPath,
) -> CoreResult<()> {
    // Step 1: the second row of SelectNodeInfo(src) — the first is BASE —
    // is the layer that recorded the deletion/move of the source.
    let src_rows = queries::select_node_info(conn, wc_id, move_root_src_relpath)?;
    let src_op_depth = src_rows
        .get(1)
        .map(|row| row.op_depth)
        .ok_or_else(|| CoreError::NotDeleted(move_root_src_relpath.clone()))?;

    let dst_op_depth = move_root_dst_relpath.depth() as i64;

    // Step 3: drop the destination subtree at its own layer.
    queries::delete_working_op_depth(conn, wc_id, move_root_dst_relpath, dst_op_depth)?;

    // Step 4: re-copy every row of the source's deletion layer onto the
    // destination, translating relpaths.
    for row in queries::select_local_relpath_op_depth(conn, wc_id, move_root_src_relpath, src_op_depth)? {
        let dst_relpath = row.relpath.rebase(move_root_src_relpath, move_root_dst_relpath);
        let dst_parent_relpath = dst_relpath
            .parent()
            .unwrap_or_else(RelPath::root);
        queries::copy_node_move(
            conn,
            wc_id,
            &row.relpath,
            src_op_depth,
            &dst_relpath,
            dst_op_depth,
            &dst_parent_relpath,
        )?;
    }

    Ok(())
}
