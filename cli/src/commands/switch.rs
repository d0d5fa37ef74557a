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

use std::io::Write as _;

use tracing::instrument;

use tcmerge_lib::db::WCRoot;
use tcmerge_lib::pristine::PristineStore;
use tcmerge_lib::ra::{LocalRepositoryAccess, RaRegistry};
use tcmerge_lib::switch::run_switch;

use crate::command_error::CommandError;
use crate::commands::Cli;
use crate::config::Config;
use crate::ui::{TerminalNotifySink, Ui};

/// Switch the working copy to a new URL, auto-resolving any move-vs-update
/// tree conflicts the switch produces along the way.
#[derive(clap::Args, Clone, Debug)]
pub struct SwitchArgs {
    /// Target repository URL, e.g. `file:///srv/repo/trunk`.
    target_url: String,
}

#[instrument(skip(ui, cli, cfg))]
pub fn cmd_switch(ui: &mut Ui, cli: &Cli, cfg: &Config, args: &SwitchArgs) -> Result<(), CommandError> {
    let mut wc_root = WCRoot::open(&cli.wc_root, 1)?;
    let pristine = PristineStore::open_with_shard_width(
        cli.wc_root.join(".tcmerge-pristine"),
        cfg.pristine_shard_width,
    )?;

    let mut registry = RaRegistry::new();
    registry.register("file", |url| {
        let path = url.strip_prefix("file://").unwrap_or(url);
        Box::new(LocalRepositoryAccess::new(path, 0))
    });

    let mut notify = TerminalNotifySink;
    let work_items = run_switch(
        &mut wc_root,
        &pristine,
        &registry,
        &args.target_url,
        &mut notify,
        cfg.marker_banner_width,
    )?;
    writeln!(ui.status(), "Applied {} deferred work item(s).", work_items.len())?;
    Ok(())
}
