// Copyright 2022 Google LLC
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

//! A small taxonomy of CLI-facing errors, wrapping library, argument-
//! parsing, and I/O failures for terminal display with an exit code.

use std::process::ExitCode;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Core(#[from] tcmerge_lib::CoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Clap(#[from] clap::Error),
}

impl CommandError {
    pub fn config(message: impl Into<String>) -> Self {
        CommandError::Config(message.into())
    }

    /// Exit code convention: clap parsing failures get 2, everything else
    /// gets 1.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CommandError::Clap(_) => ExitCode::from(2),
            _ => ExitCode::from(1),
        }
    }
}
