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

//! A cooperative cancellation probe, polled between editor callbacks and
//! before each child in the directory walk.

use crate::error::{CoreError, CoreResult};

pub trait CancelProbe {
    fn check(&self) -> CoreResult<()>;
}

pub struct NeverCancelled;

impl CancelProbe for NeverCancelled {
    fn check(&self) -> CoreResult<()> {
        Ok(())
    }
}

impl<F: Fn() -> bool> CancelProbe for F {
    fn check(&self) -> CoreResult<()> {
        if self() {
            Err(CoreError::Cancelled)
        } else {
            Ok(())
        }
    }
}
