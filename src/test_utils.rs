// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test doubles for nodes, providers and the Kubernetes API.

use crate::error::{KrustletError, Result};
use crate::nodes::{Node, NodeCommand};
use crate::providers::Provider;
use async_trait::async_trait;
use http::{Request, Response};
use kube::client::Body;
use kube::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// Scripted result of a command on a [`FakeNode`]
#[derive(Debug, Clone)]
pub enum Outcome {
    Ok(Vec<String>),
    Fail(String),
}

impl Outcome {
    pub fn ok() -> Self {
        Outcome::Ok(Vec::new())
    }

    pub fn fail(output: &str) -> Self {
        Outcome::Fail(output.to_string())
    }
}

#[derive(Default)]
struct FakeState {
    scripts: HashMap<String, Vec<Outcome>>,
    calls: Vec<(String, Option<String>)>,
}

/// A node that records every command and answers from a script.
///
/// Unscripted commands succeed with no output. A scripted command returns its
/// outcomes in order and then keeps repeating the last one.
#[derive(Clone)]
pub struct FakeNode {
    name: String,
    role: String,
    state: Arc<Mutex<FakeState>>,
}

impl FakeNode {
    pub fn new(name: &str, role: &str) -> Self {
        Self {
            name: name.to_string(),
            role: role.to_string(),
            state: Arc::new(Mutex::new(FakeState::default())),
        }
    }

    pub fn on(self, cmd: &str, outcomes: Vec<Outcome>) -> Self {
        self.state
            .lock()
            .unwrap()
            .scripts
            .insert(cmd.to_string(), outcomes);
        self
    }

    pub fn into_node(self) -> Arc<dyn Node> {
        Arc::new(self)
    }

    /// Every command run so far, in order
    pub fn commands(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .map(|(cmd, _)| cmd.clone())
            .collect()
    }

    /// How many times `cmd` was run
    pub fn count(&self, cmd: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|(c, _)| c == cmd)
            .count()
    }

    /// Stdin passed to the last run of `cmd`
    pub fn stdin_for(&self, cmd: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .rev()
            .find(|(c, _)| c == cmd)
            .and_then(|(_, stdin)| stdin.clone())
    }
}

#[async_trait]
impl Node for FakeNode {
    fn name(&self) -> &str {
        &self.name
    }

    async fn role(&self) -> Result<String> {
        Ok(self.role.clone())
    }

    async fn run(&self, cmd: &NodeCommand) -> Result<Vec<String>> {
        let rendered = cmd.to_string();
        let mut state = self.state.lock().unwrap();
        let previous = state.calls.iter().filter(|(c, _)| *c == rendered).count();
        state.calls.push((rendered.clone(), cmd.stdin.clone()));

        let outcome = state
            .scripts
            .get(&rendered)
            .and_then(|outcomes| outcomes.get(previous.min(outcomes.len().saturating_sub(1))))
            .cloned()
            .unwrap_or_else(Outcome::ok);

        match outcome {
            Outcome::Ok(lines) => Ok(lines),
            Outcome::Fail(output) => Err(KrustletError::CommandFailed {
                command: rendered,
                status: "exit status: 1".to_string(),
                output,
            }),
        }
    }
}

/// A provider over a fixed set of nodes and a canned kubeconfig
pub struct FakeProvider {
    nodes: Vec<Arc<dyn Node>>,
    kubeconfig: Option<String>,
    kubeconfig_requests: Mutex<Vec<(String, bool)>>,
}

impl FakeProvider {
    pub fn new(nodes: Vec<Arc<dyn Node>>) -> Self {
        Self {
            nodes,
            kubeconfig: Some(kubeconfig_yaml("https://127.0.0.1:6443")),
            kubeconfig_requests: Mutex::new(Vec::new()),
        }
    }

    /// Make every kubeconfig request fail
    pub fn without_kubeconfig(mut self) -> Self {
        self.kubeconfig = None;
        self
    }

    /// Recorded `(cluster, internal)` kubeconfig requests
    pub fn kubeconfig_requests(&self) -> Vec<(String, bool)> {
        self.kubeconfig_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for FakeProvider {
    async fn list_nodes(&self, _cluster: &str) -> Result<Vec<Arc<dyn Node>>> {
        Ok(self.nodes.clone())
    }

    async fn kubeconfig(&self, cluster: &str, internal: bool) -> Result<String> {
        self.kubeconfig_requests
            .lock()
            .unwrap()
            .push((cluster.to_string(), internal));
        self.kubeconfig.clone().ok_or_else(|| {
            KrustletError::KubeconfigError(format!("no kubeconfig for cluster {}", cluster))
        })
    }
}

/// A minimal admin kubeconfig pointing at `server`
pub fn kubeconfig_yaml(server: &str) -> String {
    format!(
        r#"apiVersion: v1
kind: Config
clusters:
- name: kind
  cluster:
    server: {server}
    certificate-authority-data: Y2E=
contexts:
- name: kubernetes-admin@kind
  context:
    cluster: kind
    user: kubernetes-admin
current-context: kubernetes-admin@kind
users:
- name: kubernetes-admin
  user:
    token: abc
"#
    )
}

/// A mock HTTP service that returns predefined responses based on request paths.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: Arc<Mutex<Vec<(String, String, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.respond("GET", path, status, body)
    }

    /// Add a response for PATCH requests matching the exact path
    pub fn on_patch(self, path: &str, status: u16, body: &str) -> Self {
        self.respond("PATCH", path, status, body)
    }

    fn respond(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses.lock().unwrap().insert(
            (method.to_string(), path.to_string()),
            (status, body.to_string()),
        );
        self
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    /// Recorded `(method, path, body)` of every request
    pub fn requests(&self) -> Vec<(String, String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        let response = self
            .responses
            .lock()
            .unwrap()
            .get(&(method.clone(), path.clone()))
            .cloned();
        let requests = Arc::clone(&self.requests);

        Box::pin(async move {
            let body = req.into_body().collect_bytes().await?;
            requests.lock().unwrap().push((
                method,
                path.clone(),
                String::from_utf8_lossy(&body).into_owned(),
            ));

            let (status, body) = response.unwrap_or_else(|| {
                let name = path.rsplit('/').next().unwrap_or_default();
                (404, not_found_json("certificatesigningrequests", name))
            });
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a mock CertificateSigningRequest JSON response
pub fn csr_json(name: &str) -> String {
    serde_json::json!({
        "apiVersion": "certificates.k8s.io/v1",
        "kind": "CertificateSigningRequest",
        "metadata": {
            "name": name,
            "uid": "test-uid"
        },
        "spec": {
            "request": "cmVxdWVzdA==",
            "signerName": "kubernetes.io/kubelet-serving",
            "usages": ["digital signature", "key encipherment", "server auth"]
        }
    })
    .to_string()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}
