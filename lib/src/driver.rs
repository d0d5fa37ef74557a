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

//! The Edit Driver: walks the post-update source subtree and the
//! pre-update destination subtree in lockstep, using the source as the
//! shape reference.

use tracing::instrument;

use crate::cancel::CancelProbe;
use crate::conflict::{IncomingChange, LocalChange, OperationKind};
use crate::db::{queries, NodeKind, WcId};
use crate::editor::TreeConflictEditor;
use crate::error::{CoreError, CoreResult};
use crate::pristine::PristineStore;
use crate::repo_path::RelPath;

/// `Drive(tc_editor, src_relpath, dst_relpath, operation, local_change,
/// incoming_change, old_version, new_version)`. The change pair is carried
/// for instrumentation only; the editor decides what to do with each node
/// from the database rows it reads, not from these labels.
#[allow(clippy::too_many_arguments)]
#[instrument(skip(editor, conn, pristine, cancel))]
pub fn drive<E: TreeConflictEditor>(
    editor: &mut E,
    conn: &rusqlite::Transaction,
    wc_id: WcId,
    pristine: &PristineStore,
    src_relpath: &RelPath,
    dst_relpath: &RelPath,
    move_root_dst_relpath: &RelPath,
    operation: OperationKind,
    local_change: LocalChange,
    incoming_change: IncomingChange,
    cancel: &dyn CancelProbe,
) -> CoreResult<()> {
    if !matches!(operation, OperationKind::Update | OperationKind::Switch) {
        return Err(CoreError::UnsupportedOperation(src_relpath.clone()));
    }

    let move_root_dst_revision = queries::depth_get_info(
        conn,
        wc_id,
        move_root_dst_relpath,
        move_root_dst_relpath.depth() as i64,
    )?
    .revision
    .ok_or_else(|| CoreError::AssertionViolation(format!("'{move_root_dst_relpath}' has no revision")))?;

    walk_node(
        editor,
        conn,
        wc_id,
        pristine,
        src_relpath,
        dst_relpath,
        move_root_dst_relpath,
        move_root_dst_revision,
        cancel,
    )?;
    editor.complete()
}

#[allow(clippy::too_many_arguments)]
fn walk_node<E: TreeConflictEditor>(
    editor: &mut E,
    conn: &rusqlite::Transaction,
    wc_id: WcId,
    pristine: &PristineStore,
    src_relpath: &RelPath,
    dst_relpath: &RelPath,
    move_root_dst_relpath: &RelPath,
    move_root_dst_revision: i64,
    cancel: &dyn CancelProbe,
) -> CoreResult<()> {
    cancel.check()?;

    let src = queries::base_get_info(conn, wc_id, src_relpath)?;
    match src.kind {
        NodeKind::File | NodeKind::Symlink => {
            let checksum = src
                .checksum
                .clone()
                .ok_or_else(|| CoreError::AssertionViolation(format!("'{src_relpath}' has no checksum")))?;
            let contents = pristine.read_to_vec(&checksum)?;
            editor.alter_file(dst_relpath, move_root_dst_revision, None, &checksum, &contents)
        }
        NodeKind::Directory => {
            for child_name in queries::base_get_children(conn, wc_id, src_relpath)? {
                cancel.check()?;
                let src_child = src_relpath.join(&child_name);
                let Some(deletion) = queries::scan_deletion(conn, wc_id, &src_child)? else {
                    // Not moved away at all: nothing for this core to do
                    // with it (it isn't part of the move pair under
                    // resolution).
                    continue;
                };
                if &deletion.move_op_root_relpath != move_root_dst_relpath {
                    // This child moved somewhere else entirely; it is not
                    // part of the move pair this invocation resolves.
                    continue;
                }
                let dst_child = dst_relpath.join(&child_name);
                walk_node(
                    editor,
                    conn,
                    wc_id,
                    pristine,
                    &src_child,
                    &dst_child,
                    move_root_dst_relpath,
                    move_root_dst_revision,
                    cancel,
                )?;
            }
            Ok(())
        }
        NodeKind::Absent | NodeKind::Unknown => Ok(()),
    }
}
