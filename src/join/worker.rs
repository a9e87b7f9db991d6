// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The join recipe for a single krustlet node

use crate::config::Config;
use crate::constants::{csr_name, KRUSTLET_SERVICE};
use crate::error::{Result, StepContext};
use crate::join::credentials::provision_credentials;
use crate::kubernetes::{wait_for_csr, CsrApprover, PollOutcome};
use crate::nodes::{Node, NodeCommand};
use crate::providers::Provider;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Everything one worker task owns
pub struct WorkerJoin {
    pub node: Arc<dyn Node>,
    pub control_plane: Arc<dyn Node>,
    pub approver: Arc<dyn CsrApprover>,
    pub provider: Arc<dyn Provider>,
    pub config: Arc<Config>,
}

impl WorkerJoin {
    /// Credentials, enable, start, wait for the CSR, approve. Stops at the first
    /// failing step; a CSR that never shows up is not a failure by itself.
    #[instrument(skip_all, fields(node = %self.node.name()))]
    pub async fn run(self) -> Result<()> {
        provision_credentials(
            self.node.as_ref(),
            self.control_plane.as_ref(),
            self.provider.as_ref(),
            &self.config,
        )
        .await?;

        self.systemctl("enable")
            .await
            .step("failed to enable krustlet service")?;
        self.systemctl("start")
            .await
            .step("failed to run `systemctl start krustlet`")?;

        let csr = csr_name(self.node.name());
        match wait_for_csr(
            self.approver.as_ref(),
            &csr,
            self.config.csr_poll_attempts,
            self.config.csr_poll_interval,
        )
        .await
        {
            PollOutcome::Found { attempts } => {
                debug!("CSR {} visible after {} attempts", csr, attempts)
            }
            PollOutcome::Exhausted { attempts } => warn!(
                "CSR {} still missing after {} attempts, approving anyway",
                csr, attempts
            ),
        }

        self.approver
            .approve(&csr)
            .await
            .step(format!("failed to approve certificate signing request {}", csr))?;

        info!("Krustlet node {} joined", self.node.name());
        Ok(())
    }

    async fn systemctl(&self, verb: &str) -> Result<()> {
        let lines = self
            .node
            .run(&NodeCommand::new(["systemctl", verb, KRUSTLET_SERVICE]))
            .await?;
        debug!("{}", lines.join("\n"));
        Ok(())
    }
}
