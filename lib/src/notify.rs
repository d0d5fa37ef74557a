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

//! The notification sink: events emitted to a caller-owned callback, in
//! the same order as the mutations they describe.

use crate::db::NodeKind;
use crate::repo_path::RelPath;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyAction {
    UpdateUpdate,
    UpdateCompleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentState {
    /// Incoming change applied with no local modification to reconcile.
    Changed,
    /// Incoming change merged cleanly alongside a local modification.
    Merged,
    /// Merge produced a conflict; markers were queued.
    Conflicted,
    /// Nothing to do — no modification on either side.
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropState {
    Unknown,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub path: RelPath,
    pub action: NotifyAction,
    pub kind: Option<NodeKind>,
    pub content_state: Option<ContentState>,
    pub prop_state: Option<PropState>,
    pub old_revision: Option<i64>,
    pub revision: Option<i64>,
}

/// A notification sink. Implemented by `Vec<Notification>` for tests and by
/// the CLI's terminal printer for interactive use.
pub trait NotifySink {
    fn notify(&mut self, notification: Notification);
}

impl NotifySink for Vec<Notification> {
    fn notify(&mut self, notification: Notification) {
        self.push(notification);
    }
}

/// A no-op sink, for callers that don't care about progress output.
pub struct NullSink;

impl NotifySink for NullSink {
    fn notify(&mut self, _notification: Notification) {}
}
