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

//! `switch` orchestration: resolve the repository-access session for a
//! target URL, crawl the working copy for tree-conflict victims, and
//! invoke the Coordinator once per victim. No wire protocol is driven
//! here — that is the Repository-Access Dispatcher's concern, and it is
//! out of scope beyond the `RepositoryAccess` trait itself.

use tracing::{info, instrument, warn};

use crate::conflict;
use crate::coordinator::update_moved_away_conflict_victim;
use crate::db::WCRoot;
use crate::error::CoreResult;
use crate::notify::NotifySink;
use crate::pristine::PristineStore;
use crate::ra::RaRegistry;
use crate::work_queue::{self, WorkQueue};

/// Resolves `target_url` against `registry` (failing the switch early if
/// no backend is registered for its scheme) and runs the Coordinator
/// against every tree-conflict victim recorded in `wc_root`.
#[instrument(skip(wc_root, pristine, registry, notify))]
#[allow(clippy::too_many_arguments)]
pub fn run_switch(
    wc_root: &mut WCRoot,
    pristine: &PristineStore,
    registry: &RaRegistry,
    target_url: &str,
    notify: &mut dyn NotifySink,
    marker_banner_width: usize,
) -> CoreResult<WorkQueue> {
    let ra_session = registry.resolve(target_url)?;
    let latest_revision = ra_session.latest_revision()?;
    info!(url = target_url, revision = latest_revision, "switch: resolved RA session");

    let victims = conflict::list_tree_conflict_victims(wc_root.connection(), wc_root.wc_id())?;
    info!(victims = victims.len(), "switch: crawling tree-conflict victims");

    let mut work_items = WorkQueue::new();
    for victim_relpath in victims {
        match update_moved_away_conflict_victim(
            wc_root,
            pristine,
            &victim_relpath,
            notify,
            &crate::cancel::NeverCancelled,
            marker_banner_width,
        ) {
            Ok(items) => work_items.extend(items),
            Err(err) => {
                warn!(path = %victim_relpath, error = %err, "switch: could not auto-resolve victim, leaving conflict in place");
            }
        }
    }

    work_queue::run_work_items(wc_root.abspath(), pristine, &work_items)?;
    Ok(work_items)
}
