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

pub mod propset;
pub mod switch;

use clap::Subcommand;

use crate::command_error::CommandError;
use crate::config::Config;
use crate::ui::Ui;

#[derive(clap::Parser, Clone, Debug)]
#[command(name = "tcmerge", about = "Resolve move-vs-update tree conflicts in a working copy")]
pub struct Cli {
    /// Working copy root directory.
    #[arg(long, global = true, default_value = ".")]
    pub wc_root: std::path::PathBuf,

    /// Optional TOML config file; defaults are used when absent.
    #[arg(long, global = true)]
    pub config_file: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    Switch(switch::SwitchArgs),
    Propset(propset::PropsetArgs),
}

pub fn run(ui: &mut Ui, cli: &Cli, cfg: &Config) -> Result<(), CommandError> {
    match &cli.command {
        Commands::Switch(args) => switch::cmd_switch(ui, cli, cfg, args),
        Commands::Propset(args) => propset::cmd_propset(ui, cli, args),
    }
}
