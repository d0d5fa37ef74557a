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

//! The Tree-Conflict Editor receiver: only `alter_file`, `complete`, and
//! `abort` perform work. The editor's per-invocation state is modeled
//! here as one concrete context value, not a dynamically dispatched
//! vtable.

use std::fs;

use tracing::debug;

use crate::checksum::Checksum;
use crate::conflict::{
    conflict_create_markers, conflict_skel_set_op_update, write_conflict, ConflictSkeleton,
    ConflictVersion, IncomingChange, LocalChange, OperationKind, VersionNodeKind,
};
use crate::db::{queries, NodeKind, WcId};
use crate::editor::TreeConflictEditor;
use crate::error::{CoreError, CoreResult};
use crate::merge_text::{merge3, render_conflict_markers, MergeOutcome};
use crate::notify::{ContentState, NotifyAction, NotifySink, Notification};
use crate::pristine::PristineStore;
use crate::repo_path::RelPath;
use crate::work_queue::{WorkItem, WorkQueue};

/// Per-invocation context threaded through the editor callbacks, modeled
/// as one concrete value rather than an opaque baton pointer.
pub struct TreeConflictReceiver<'a> {
    pub wc_id: WcId,
    pub wc_abspath: &'a std::path::Path,
    pub conn: &'a rusqlite::Transaction<'a>,
    pub pristine: &'a PristineStore,
    pub move_root_src_relpath: RelPath,
    pub move_root_dst_relpath: RelPath,
    pub old_version: ConflictVersion,
    pub new_version: ConflictVersion,
    pub marker_banner_width: usize,
    pub work_items: &'a mut WorkQueue,
    pub notify: &'a mut dyn NotifySink,
}

impl<'a> TreeConflictReceiver<'a> {
    fn dst_op_depth(&self) -> i64 {
        self.move_root_dst_relpath.depth() as i64
    }

    /// Update-Working-File algorithm: merges the incoming content into
    /// whatever is on disk, resolving cleanly or queuing conflict markers.
    fn update_working_file(
        &mut self,
        dst_relpath: &RelPath,
        dst_checksum: &Checksum,
        dst_repos_relpath: Option<&str>,
        post_update_contents: &[u8],
    ) -> CoreResult<()> {
        let base = self.pristine.read_to_vec(dst_checksum)?;
        let working_abspath = dst_relpath.to_abspath(self.wc_abspath);
        let working_bytes = fs::read(&working_abspath).unwrap_or_default();

        match merge3(&base, post_update_contents, &working_bytes) {
            MergeOutcome::Conflict(hunks) => {
                let mut skel = ConflictSkeleton {
                    operation: OperationKind::Update,
                    local_change: LocalChange::Edited,
                    incoming_change: IncomingChange::Edit,
                    tree_conflicted: false,
                    old_version: self.old_version.clone(),
                    new_version: Some(self.new_version.clone()),
                    original_version: None,
                };
                let original_version = ConflictVersion {
                    path_in_repos: dst_repos_relpath
                        .map(str::to_owned)
                        .unwrap_or_else(|| self.old_version.path_in_repos.clone()),
                    node_kind: VersionNodeKind::File,
                    ..self.old_version.clone()
                };
                conflict_skel_set_op_update(&mut skel, original_version);
                write_conflict(self.conn, self.wc_id, dst_relpath, &skel)?;

                let marker_text = render_conflict_markers(&hunks, self.marker_banner_width);
                self.work_items
                    .push(conflict_create_markers(dst_relpath, marker_text));

                self.notify.notify(Notification {
                    path: dst_relpath.clone(),
                    action: NotifyAction::UpdateUpdate,
                    kind: Some(NodeKind::File),
                    content_state: Some(ContentState::Conflicted),
                    prop_state: None,
                    old_revision: Some(self.old_version.peg_rev),
                    revision: Some(self.new_version.peg_rev),
                });
            }
            MergeOutcome::Merged(result) | MergeOutcome::Unchanged(result) => {
                let local_modified = working_bytes != base;
                let result_checksum = self.pristine.write(&result)?;
                self.work_items.push(WorkItem::InstallFile {
                    dst: dst_relpath.clone(),
                    checksum: result_checksum,
                });

                self.notify.notify(Notification {
                    path: dst_relpath.clone(),
                    action: NotifyAction::UpdateUpdate,
                    kind: Some(NodeKind::File),
                    content_state: Some(if local_modified {
                        ContentState::Merged
                    } else {
                        ContentState::Changed
                    }),
                    prop_state: None,
                    old_revision: Some(self.old_version.peg_rev),
                    revision: Some(self.new_version.peg_rev),
                });
            }
        }
        Ok(())
    }
}

impl<'a> TreeConflictEditor for TreeConflictReceiver<'a> {
    fn alter_file(
        &mut self,
        dst_relpath: &RelPath,
        expected_dst_revision: i64,
        _props: Option<()>,
        src_checksum: &Checksum,
        post_update_contents: &[u8],
    ) -> CoreResult<()> {
        let dst_op_depth = self.dst_op_depth();
        let dst = queries::depth_get_info(self.conn, self.wc_id, dst_relpath, dst_op_depth)?;

        if dst.revision != Some(expected_dst_revision) {
            return Err(CoreError::AssertionViolation(format!(
                "'{dst_relpath}' revision {:?} != expected {expected_dst_revision}",
                dst.revision
            )));
        }
        if dst.kind != NodeKind::File {
            return Err(CoreError::AssertionViolation(format!(
                "'{dst_relpath}' is not a file"
            )));
        }

        let dst_checksum = dst.checksum.clone().ok_or_else(|| {
            CoreError::AssertionViolation(format!("'{dst_relpath}' has no checksum"))
        })?;
        if &dst_checksum == src_checksum {
            // Round-trip fast path: checksums already match, so there's
            // nothing to merge, queue, or notify about.
            debug!(path = %dst_relpath, "alter_file: checksums match, nothing to do");
            return Ok(());
        }

        if queries::is_shadowed_above(self.conn, self.wc_id, dst_relpath, dst_op_depth)? {
            // The destination is shadowed by a later local change. Raise
            // a new, unresolved tree conflict on it rather than silently
            // dropping the update or refusing the whole resolution, so
            // the missed update stays visible to a later resolve pass.
            let skel = ConflictSkeleton {
                operation: OperationKind::Update,
                local_change: LocalChange::Edited,
                incoming_change: IncomingChange::Edit,
                tree_conflicted: true,
                old_version: self.old_version.clone(),
                new_version: Some(self.new_version.clone()),
                original_version: None,
            };
            write_conflict(self.conn, self.wc_id, dst_relpath, &skel)?;
            debug!(path = %dst_relpath, "alter_file: shadowed, recorded unresolved conflict");
            return Ok(());
        }

        self.update_working_file(
            dst_relpath,
            &dst_checksum,
            dst.repos_relpath.as_deref(),
            post_update_contents,
        )
    }

    fn complete(&mut self) -> CoreResult<()> {
        self.notify.notify(Notification {
            path: self.move_root_dst_relpath.clone(),
            action: NotifyAction::UpdateCompleted,
            kind: None,
            content_state: None,
            prop_state: None,
            old_revision: None,
            revision: Some(self.new_version.peg_rev),
        });
        Ok(())
    }

    fn abort(&mut self) -> CoreResult<()> {
        Ok(())
    }
}
