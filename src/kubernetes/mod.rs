// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for kubeconfig handling and certificate signing request approval.

pub mod csr;
pub mod kubeconfig;

pub use csr::{wait_for_csr, ApiApprover, CsrApprover, KubectlApprover, PollOutcome};
pub use kubeconfig::{create_client_from_kubeconfig, rewrite_server};
