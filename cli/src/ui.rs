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

//! Terminal output, kept separate from `tracing` diagnostics: this is
//! user-facing progress text, not a log stream.

use std::io;
use std::io::Write as _;

use tcmerge_lib::notify::{ContentState, Notification, NotifyAction, NotifySink};

pub struct Ui {
    stdout: io::Stdout,
}

impl Ui {
    pub fn new() -> Self {
        Ui { stdout: io::stdout() }
    }

    pub fn status(&self) -> io::StdoutLock<'_> {
        self.stdout.lock()
    }
}

impl Default for Ui {
    fn default() -> Self {
        Ui::new()
    }
}

/// Prints notifications to the terminal as they arrive, mirroring the
/// one-line-per-path convention of an update/switch progress report.
pub struct TerminalNotifySink;

impl NotifySink for TerminalNotifySink {
    fn notify(&mut self, notification: Notification) {
        let letter = match (notification.action, notification.content_state) {
            (NotifyAction::UpdateUpdate, Some(ContentState::Conflicted)) => 'C',
            (NotifyAction::UpdateUpdate, Some(ContentState::Merged)) => 'G',
            (NotifyAction::UpdateUpdate, Some(ContentState::Changed)) => 'U',
            (NotifyAction::UpdateUpdate, _) => ' ',
            (NotifyAction::UpdateCompleted, _) => return,
        };
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{letter}    {}", notification.path);
    }
}
