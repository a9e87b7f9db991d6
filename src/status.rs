// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! User-facing progress line for a long running step

use tracing::{error, info};

/// A started step. Dropping it without calling [`Status::success`] reports failure.
pub struct Status {
    message: String,
    finished: bool,
}

impl Status {
    pub fn start(message: impl Into<String>) -> Self {
        let message = message.into();
        info!(" • {} ...", message);
        Self {
            message,
            finished: false,
        }
    }

    pub fn success(mut self) {
        info!(" ✓ {}", self.message);
        self.finished = true;
    }
}

impl Drop for Status {
    fn drop(&mut self) {
        if !self.finished {
            error!(" ✗ {}", self.message);
        }
    }
}
