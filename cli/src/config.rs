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

//! Small, file-backed configuration. Deliberately tiny: this tool has one
//! subsystem to tune, not a general-purpose settings surface.

use std::path::Path;

use serde::Deserialize;

use crate::command_error::CommandError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of marker characters each conflict-marker banner line uses
    /// (`<<<<<<<` is width 7).
    pub marker_banner_width: usize,
    /// Number of leading hex characters used to shard the pristine store.
    pub pristine_shard_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            marker_banner_width: 7,
            pristine_shard_width: 2,
        }
    }
}

impl Config {
    /// Loads `path` if it exists, falling back to defaults otherwise.
    pub fn load(path: &Path) -> Result<Self, CommandError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let source = ::config::Config::builder()
            .add_source(::config::File::from(path))
            .build()
            .map_err(|e| CommandError::config(e.to_string()))?;
        source
            .try_deserialize()
            .map_err(|e| CommandError::config(e.to_string()))
    }
}
