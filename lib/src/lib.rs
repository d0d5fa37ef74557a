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

//! Automatic resolution of update-time tree conflicts caused by local
//! moves: when a file or directory has been moved away in the working
//! copy and an update or switch would otherwise touch its old location,
//! this crate replays the incoming change onto the new location instead
//! of leaving the move behind.

pub mod cancel;
pub mod checksum;
pub mod conflict;
pub mod coordinator;
pub mod db;
pub mod driver;
pub mod editor;
pub mod error;
pub mod layer_replace;
pub mod merge_text;
pub mod notify;
pub mod pristine;
pub mod properties;
pub mod ra;
pub mod receiver;
pub mod repo_path;
pub mod switch;
pub mod work_queue;

pub use coordinator::update_moved_away_conflict_victim;
pub use error::{CoreError, CoreResult};
