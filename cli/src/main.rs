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

mod command_error;
mod commands;
mod config;
mod ui;

use std::process::ExitCode;

use clap::Parser as _;

use command_error::CommandError;
use commands::Cli;
use ui::Ui;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config_path = cli
        .config_file
        .clone()
        .unwrap_or_else(|| cli.wc_root.join("tcmerge.toml"));
    let cfg = match config::Config::load(&config_path) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("error: {err}");
            return err.exit_code();
        }
    };
    tracing::debug!(?cfg, "loaded configuration");

    let mut ui = Ui::new();
    match commands::run(&mut ui, &cli, &cfg) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            err.exit_code()
        }
    }
}
