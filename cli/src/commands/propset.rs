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
use tcmerge_lib::properties::set_property;
use tcmerge_lib::repo_path::RelPath;

use crate::command_error::CommandError;
use crate::commands::Cli;
use crate::ui::Ui;

/// Set a property on a path in the working copy. Storage only — property
/// merge semantics during resolution are not implemented.
#[derive(clap::Args, Clone, Debug)]
pub struct PropsetArgs {
    /// Property name, e.g. `svn:eol-style`.
    name: String,
    /// Property value.
    value: String,
    /// Path, relative to the working copy root.
    path: String,
}

#[instrument(skip(ui, cli))]
pub fn cmd_propset(ui: &mut Ui, cli: &Cli, args: &PropsetArgs) -> Result<(), CommandError> {
    let mut wc_root = WCRoot::open(&cli.wc_root, 1)?;
    let wc_id = wc_root.wc_id();
    let relpath = RelPath::from(args.path.as_str());
    wc_root.with_transaction(|tx| set_property(tx, wc_id, &relpath, &args.name, &args.value))?;
    writeln!(ui.status(), "property '{}' set on '{relpath}'.", args.name)?;
    Ok(())
}
