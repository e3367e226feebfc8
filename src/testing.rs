//! In-memory doubles for the cluster and the clock

use async_trait::async_trait;
use futures::io::AsyncRead;
use std::collections::BTreeMap;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use crate::framework::{copy_stream, FrameworkError, Result};
use crate::k8s::{CustomResourceSpec, LogSink, Platform, WorkloadSpec, WorkloadSummary};
use crate::utils::Clock;

/// Build an API error as the server would return it
pub fn api_error(code: u16, reason: &str) -> kube::Error {
    kube::Error::Api(kube::core::ErrorResponse {
        status: "Failure".to_string(),
        message: format!("injected {reason}"),
        reason: reason.to_string(),
        code,
    })
}

/// Clock that only moves when slept on or advanced
pub struct ManualClock {
    start: Instant,
    offset: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.offset.lock().unwrap() += by;
    }

    pub fn elapsed(&self) -> Duration {
        *self.offset.lock().unwrap()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        self.advance(duration);
    }
}

/// Recorded platform operation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    CreateNamespace(String),
    DeleteNamespace(String),
    NamespaceExists(String),
    CreateWorkload {
        namespace: String,
        name: String,
        image: String,
    },
    ListWorkloads(String),
    CopyLogs {
        namespace: String,
        workload: String,
        tail_lines: i64,
    },
    Probe {
        host: String,
        namespace: String,
    },
}

/// Scripted log stream behaviour
pub enum LogBehavior {
    Content(Vec<u8>),
    FailOpen(kube::Error),
    /// Serve `after` bytes of `content`, then fail the read
    FailAfter { content: Vec<u8>, after: usize },
}

#[derive(Default)]
struct FakeState {
    calls: Mutex<Vec<Call>>,
    namespaces: Mutex<BTreeMap<String, Vec<WorkloadSummary>>>,
    deleted: Mutex<BTreeMap<String, u32>>,
    ready_on_probe: Option<u32>,
    linger_lookups: u32,
    probes: AtomicU32,
    generated: AtomicU32,
    namespace_error: Mutex<Option<kube::Error>>,
    workload_error: Mutex<Option<kube::Error>>,
    probe_error: Mutex<Option<kube::Error>>,
    delete_error: Mutex<Option<kube::Error>>,
    logs: Mutex<Option<LogBehavior>>,
    stream_opened: AtomicBool,
    stream_closed: Arc<AtomicBool>,
}

/// In-memory cluster; clones share state
#[derive(Clone, Default)]
pub struct FakePlatform {
    state: Arc<FakeState>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    fn state_mut(&mut self) -> &mut FakeState {
        Arc::get_mut(&mut self.state).expect("configure before sharing")
    }

    /// Report ready on probe number `n` (1-based); never ready by default
    pub fn ready_on_probe(mut self, n: u32) -> Self {
        self.state_mut().ready_on_probe = Some(n);
        self
    }

    /// Keep a deleted namespace visible for `lookups` existence checks
    pub fn namespace_lingers(mut self, lookups: u32) -> Self {
        self.state_mut().linger_lookups = lookups;
        self
    }

    pub fn namespace_error(self, err: kube::Error) -> Self {
        *self.state.namespace_error.lock().unwrap() = Some(err);
        self
    }

    pub fn workload_error(self, err: kube::Error) -> Self {
        *self.state.workload_error.lock().unwrap() = Some(err);
        self
    }

    pub fn probe_error(self, err: kube::Error) -> Self {
        *self.state.probe_error.lock().unwrap() = Some(err);
        self
    }

    /// Fail the next namespace deletion
    pub fn delete_error(self, err: kube::Error) -> Self {
        *self.state.delete_error.lock().unwrap() = Some(err);
        self
    }

    pub fn logs(self, behavior: LogBehavior) -> Self {
        *self.state.logs.lock().unwrap() = Some(behavior);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.state.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    pub fn probe_count(&self) -> u32 {
        self.state.probes.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.count(|c| matches!(c, Call::DeleteNamespace(_)))
    }

    pub fn has_namespace(&self, name: &str) -> bool {
        self.state.namespaces.lock().unwrap().contains_key(name)
    }

    pub fn stream_opened(&self) -> bool {
        self.state.stream_opened.load(Ordering::SeqCst)
    }

    pub fn stream_closed(&self) -> bool {
        self.state.stream_closed.load(Ordering::SeqCst)
    }

    fn record(&self, call: Call) {
        self.state.calls.lock().unwrap().push(call);
    }

    fn tracked(&self, content: Vec<u8>, fail_after: Option<usize>) -> TrackedStream {
        self.state.stream_opened.store(true, Ordering::SeqCst);
        self.state.stream_closed.store(false, Ordering::SeqCst);
        TrackedStream {
            content,
            pos: 0,
            fail_after,
            closed: self.state.stream_closed.clone(),
        }
    }
}

#[async_trait]
impl Platform for FakePlatform {
    fn host(&self) -> &str {
        "https://fake-cluster:6443"
    }

    async fn create_namespace(&self, prefix: &str) -> Result<String> {
        self.record(Call::CreateNamespace(prefix.to_string()));
        if let Some(source) = self.state.namespace_error.lock().unwrap().take() {
            return Err(FrameworkError::CreateNamespace {
                prefix: prefix.to_string(),
                source,
            });
        }

        let n = self.state.generated.fetch_add(1, Ordering::SeqCst);
        let name = format!("{prefix}{n:05x}");
        self.state
            .namespaces
            .lock()
            .unwrap()
            .insert(name.clone(), Vec::new());
        Ok(name)
    }

    async fn delete_namespace(&self, name: &str) -> Result<()> {
        self.record(Call::DeleteNamespace(name.to_string()));
        if let Some(source) = self.state.delete_error.lock().unwrap().take() {
            return Err(FrameworkError::Deletion {
                namespace: name.to_string(),
                source,
            });
        }

        self.state.namespaces.lock().unwrap().remove(name);
        self.state
            .deleted
            .lock()
            .unwrap()
            .insert(name.to_string(), self.state.linger_lookups);
        Ok(())
    }

    async fn namespace_exists(&self, name: &str) -> Result<bool> {
        self.record(Call::NamespaceExists(name.to_string()));
        if self.has_namespace(name) {
            return Ok(true);
        }

        let mut deleted = self.state.deleted.lock().unwrap();
        match deleted.get_mut(name) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn create_workload(&self, namespace: &str, spec: &WorkloadSpec) -> Result<()> {
        self.record(Call::CreateWorkload {
            namespace: namespace.to_string(),
            name: spec.name.clone(),
            image: spec.image.clone(),
        });
        if let Some(source) = self.state.workload_error.lock().unwrap().take() {
            return Err(FrameworkError::Workload {
                name: spec.name.clone(),
                namespace: namespace.to_string(),
                source,
            });
        }

        let pod = spec.to_pod();
        self.state
            .namespaces
            .lock()
            .unwrap()
            .entry(namespace.to_string())
            .or_default()
            .push(WorkloadSummary::from_pod(&pod));
        Ok(())
    }

    async fn list_workloads(&self, namespace: &str) -> Result<Vec<WorkloadSummary>> {
        self.record(Call::ListWorkloads(namespace.to_string()));
        Ok(self
            .state
            .namespaces
            .lock()
            .unwrap()
            .get(namespace)
            .cloned()
            .unwrap_or_default())
    }

    async fn copy_logs(
        &self,
        namespace: &str,
        workload: &str,
        tail_lines: i64,
        out: LogSink<'_>,
    ) -> Result<u64> {
        self.record(Call::CopyLogs {
            namespace: namespace.to_string(),
            workload: workload.to_string(),
            tail_lines,
        });

        let behavior = self.state.logs.lock().unwrap().take();
        let stream = match behavior {
            None => self.tracked(Vec::new(), None),
            Some(LogBehavior::Content(content)) => {
                let stream = self.tracked(content.clone(), None);
                *self.state.logs.lock().unwrap() = Some(LogBehavior::Content(content));
                stream
            }
            Some(LogBehavior::FailOpen(source)) => {
                return Err(FrameworkError::LogStream {
                    workload: workload.to_string(),
                    source,
                })
            }
            Some(LogBehavior::FailAfter { content, after }) => self.tracked(content, Some(after)),
        };

        copy_stream(stream, out, workload).await
    }

    async fn probe_readiness(
        &self,
        host: &str,
        namespace: &str,
        resource: &CustomResourceSpec,
    ) -> Result<bool> {
        self.record(Call::Probe {
            host: host.to_string(),
            namespace: namespace.to_string(),
        });
        let n = self.state.probes.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(source) = self.state.probe_error.lock().unwrap().take() {
            return Err(FrameworkError::Probe {
                endpoint: resource.endpoint(host, namespace),
                source,
            });
        }

        Ok(self.state.ready_on_probe.is_some_and(|ready| n >= ready))
    }
}

/// Log stream double that records when it is dropped
struct TrackedStream {
    content: Vec<u8>,
    pos: usize,
    fail_after: Option<usize>,
    closed: Arc<AtomicBool>,
}

impl AsyncRead for TrackedStream {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut [u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        let limit = this.fail_after.unwrap_or(this.content.len()).min(this.content.len());

        if this.pos >= limit {
            if this.fail_after.is_some() {
                return Poll::Ready(Err(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "log stream reset",
                )));
            }
            return Poll::Ready(Ok(0));
        }

        // small chunks so copies take several reads
        let n = buf.len().min(limit - this.pos).min(4);
        buf[..n].copy_from_slice(&this.content[this.pos..this.pos + n]);
        this.pos += n;
        Poll::Ready(Ok(n))
    }
}

impl Drop for TrackedStream {
    fn drop(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
