// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Container labels set on every kind node
pub mod labels {
    pub const CLUSTER: &str = "io.x-k8s.kind.cluster";
    pub const ROLE: &str = "io.x-k8s.kind.role";
}

/// Values of the role label
pub mod roles {
    pub const CONTROL_PLANE: &str = "control-plane";
    pub const KRUSTLET: &str = "krustlet";
    pub const EXTERNAL_LOAD_BALANCER: &str = "external-load-balancer";
}

/// Fixed paths on the nodes
pub mod paths {
    /// Static kubeconfig written to krustlet nodes
    pub const KRUSTLET_KUBECONFIG: &str = "/etc/kubernetes/kubeconfig";
    /// Bootstrap kubeconfig written to krustlet nodes in the bootstrap-token flow
    pub const BOOTSTRAP_KUBELET_CONF: &str = "/etc/kubernetes/bootstrap-kubelet.conf";
    /// Generated by the bootstrap script on the control-plane node
    pub const GENERATED_BOOTSTRAP_CONF: &str = "/root/.krustlet/config/bootstrap.conf";
    /// Admin credentials on the control-plane node
    pub const ADMIN_CONF: &str = "/etc/kubernetes/admin.conf";
}

/// systemd unit of the node agent
pub const KRUSTLET_SERVICE: &str = "krustlet";

/// Port the API server listens on inside the control-plane container
pub const API_SERVER_PORT: u16 = 6443;

/// CSR polling configuration
pub mod csr {
    /// Suffix appended to the node name to form the CSR name
    pub const NAME_SUFFIX: &str = "-tls";
    /// Poll ceiling when copying the static kubeconfig
    pub const STATIC_POLL_ATTEMPTS: u32 = 10;
    /// Poll ceiling for the bootstrap-token flow
    pub const BOOTSTRAP_POLL_ATTEMPTS: u32 = 30;
    pub const POLL_INTERVAL_SECS: u64 = 1;
}

pub const DEFAULT_CLUSTER_NAME: &str = "kind";

pub const DEFAULT_BOOTSTRAP_SCRIPT_URL: &str =
    "https://raw.githubusercontent.com/deislabs/krustlet/master/docs/howto/assets/bootstrap.sh";

/// Name of the CSR a krustlet node files for its serving certificate
pub fn csr_name(node_name: &str) -> String {
    format!("{}{}", node_name, csr::NAME_SUFFIX)
}
