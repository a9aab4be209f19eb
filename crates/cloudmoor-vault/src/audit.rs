//! Vault audit trail.
//!
//! Every [`crate::SecretStore`] operation produces exactly one [`AuditEvent`],
//! whatever its outcome. Emission is tied to the lifetime of an
//! [`AuditScope`] guard created at operation entry: the event is handed to
//! the configured [`AuditSink`] when the guard drops, which covers early
//! returns, `?` propagation, and futures dropped mid-flight.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::thread;

use chrono::{DateTime, Utc};
use cloudmoor_core::config::VaultAuditConfig;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::VaultError;

/// Audited store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOperation {
    Put,
    Get,
    Delete,
    List,
    Health,
}

impl AuditOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditOperation::Put => "put",
            AuditOperation::Get => "get",
            AuditOperation::Delete => "delete",
            AuditOperation::List => "list",
            AuditOperation::Health => "health",
        }
    }
}

impl fmt::Display for AuditOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured record of one vault operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// When the operation started.
    pub timestamp: DateTime<Utc>,

    /// Which operation ran.
    pub operation: AuditOperation,

    /// Secret name; empty for `list` and `health`.
    #[serde(default)]
    pub key: String,

    /// Whether the operation succeeded.
    pub success: bool,

    /// Failure description, present iff `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Free-form details such as payload size or result count.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl AuditEvent {
    /// Create a pending (unsuccessful, error-free) event stamped now.
    pub fn new(operation: AuditOperation, key: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            key: key.into(),
            success: false,
            error: None,
            metadata: BTreeMap::new(),
        }
    }
}

/// Receiver of audit events.
///
/// Sinks cannot fail the operation being audited; implementations that do
/// I/O log their own failures.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: &AuditEvent);
}

impl<F> AuditSink for F
where
    F: Fn(&AuditEvent) + Send + Sync,
{
    fn record(&self, event: &AuditEvent) {
        self(event)
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &AuditEvent) {}
}

/// Keeps events in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().clone()
    }

    /// Remove and return all recorded events.
    pub fn take(&self) -> Vec<AuditEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: &AuditEvent) {
        self.events.lock().push(event.clone());
    }
}

/// Emits events as `tracing` records on the `cloudmoor::audit` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: &AuditEvent) {
        let metadata = serde_json::to_string(&event.metadata).unwrap_or_default();
        if event.success {
            tracing::info!(
                target: "cloudmoor::audit",
                operation = %event.operation,
                key = %event.key,
                success = true,
                metadata = %metadata,
                timestamp = %event.timestamp.to_rfc3339(),
                "vault operation"
            );
        } else {
            tracing::warn!(
                target: "cloudmoor::audit",
                operation = %event.operation,
                key = %event.key,
                success = false,
                error = event.error.as_deref().unwrap_or_default(),
                timestamp = %event.timestamp.to_rfc3339(),
                "vault operation failed"
            );
        }
    }
}

/// Appends one JSON object per line to a file created with mode 0600.
///
/// `record` only queues the serialized line; a dedicated writer thread does
/// the blocking write and flush, so store operations running on async
/// workers never wait on disk. Dropping the sink drains the queue and joins
/// the writer.
#[derive(Debug)]
pub struct JsonlAuditSink {
    path: PathBuf,
    sender: Option<mpsc::Sender<String>>,
    writer: Option<thread::JoinHandle<()>>,
}

impl JsonlAuditSink {
    /// Open (or create) the log at `path`, creating parent directories.
    pub fn open(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut options = OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let file = options.open(&path)?;

        let (sender, receiver) = mpsc::channel();
        let writer = thread::Builder::new()
            .name("cloudmoor-audit".to_string())
            .spawn({
                let path = path.clone();
                move || write_lines(file, &path, receiver)
            })?;

        Ok(Self {
            path,
            sender: Some(sender),
            writer: Some(writer),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn write_lines(mut file: File, path: &Path, lines: mpsc::Receiver<String>) {
    for line in lines {
        if let Err(e) = writeln!(file, "{line}").and_then(|_| file.flush()) {
            tracing::warn!(path = %path.display(), "failed to write audit event: {e}");
        }
    }
}

impl AuditSink for JsonlAuditSink {
    fn record(&self, event: &AuditEvent) {
        let line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("failed to serialize audit event: {e}");
                return;
            }
        };
        let queued = self
            .sender
            .as_ref()
            .is_some_and(|sender| sender.send(line).is_ok());
        if !queued {
            tracing::warn!(path = %self.path.display(), "audit writer stopped, event dropped");
        }
    }
}

impl Drop for JsonlAuditSink {
    fn drop(&mut self) {
        // Closing the channel ends the writer loop once the queue is empty.
        drop(self.sender.take());
        if let Some(writer) = self.writer.take() {
            if writer.join().is_err() {
                tracing::warn!(path = %self.path.display(), "audit writer panicked");
            }
        }
    }
}

/// Forwards each event to every inner sink, in order.
#[derive(Default)]
pub struct FanoutAuditSink {
    sinks: Vec<Arc<dyn AuditSink>>,
}

impl FanoutAuditSink {
    pub fn new(sinks: Vec<Arc<dyn AuditSink>>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: Arc<dyn AuditSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl AuditSink for FanoutAuditSink {
    fn record(&self, event: &AuditEvent) {
        for sink in &self.sinks {
            sink.record(event);
        }
    }
}

/// Build the sink described by `config`.
///
/// `enabled` adds a [`TracingAuditSink`]; `log_path` adds a [`JsonlAuditSink`].
/// With neither, events are discarded.
pub fn sink_from_config(config: &VaultAuditConfig) -> std::io::Result<Arc<dyn AuditSink>> {
    let mut fanout = FanoutAuditSink::default();
    if config.enabled {
        fanout.push(Arc::new(TracingAuditSink));
    }
    if let Some(path) = &config.log_path {
        let path = cloudmoor_core::paths::expand_tilde(&path.to_string_lossy());
        fanout.push(Arc::new(JsonlAuditSink::open(path)?));
    }

    Ok(match fanout.len() {
        0 => Arc::new(NoopAuditSink),
        _ => Arc::new(fanout),
    })
}

/// Guard that emits one audit event when dropped.
///
/// Created at operation entry; the operation records its outcome with
/// [`AuditScope::finish`]. A guard dropped without a recorded outcome
/// (the enclosing future was cancelled) emits a failure.
pub(crate) struct AuditScope<'a> {
    sink: &'a dyn AuditSink,
    event: AuditEvent,
    finished: bool,
}

impl<'a> AuditScope<'a> {
    pub(crate) fn begin(sink: &'a dyn AuditSink, operation: AuditOperation, key: &str) -> Self {
        Self {
            sink,
            event: AuditEvent::new(operation, key),
            finished: false,
        }
    }

    pub(crate) fn metadata(&mut self, key: &str, value: impl ToString) {
        self.event.metadata.insert(key.to_string(), value.to_string());
    }

    /// Record `result` as the outcome and hand it back unchanged.
    pub(crate) fn finish<T>(mut self, result: Result<T, VaultError>) -> Result<T, VaultError> {
        match &result {
            Ok(_) => self.event.success = true,
            Err(e) => {
                self.event.success = false;
                self.event.error = Some(e.to_string());
            }
        }
        self.finished = true;
        result
    }
}

impl Drop for AuditScope<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.event.success = false;
            self.event.error = Some("operation cancelled before completion".to_string());
        }
        self.sink.record(&self.event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_event_serialization_shape() {
        let mut event = AuditEvent::new(AuditOperation::Put, "s3-token");
        event.metadata.insert("size".to_string(), "12".to_string());
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();

        assert_eq!(json["operation"], "put");
        assert_eq!(json["key"], "s3-token");
        assert_eq!(json["success"], false);
        assert_eq!(json["metadata"]["size"], "12");
        assert!(json.get("error").is_none());
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_empty_metadata_is_omitted() {
        let event = AuditEvent::new(AuditOperation::Health, "");
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert!(json.get("metadata").is_none());
    }

    #[test]
    fn test_scope_emits_success_once() {
        let sink = MemoryAuditSink::new();
        let scope = AuditScope::begin(&sink, AuditOperation::List, "");
        let result: Result<u8, VaultError> = scope.finish(Ok(3));

        assert_eq!(result.unwrap(), 3);
        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert!(events[0].success);
        assert!(events[0].error.is_none());
    }

    #[test]
    fn test_scope_emits_error_text() {
        let sink = MemoryAuditSink::new();
        let scope = AuditScope::begin(&sink, AuditOperation::Get, "missing");
        let _ = scope.finish::<()>(Err(VaultError::NotFound("missing".into())));

        let events = sink.take();
        assert_eq!(events.len(), 1);
        assert!(!events[0].success);
        assert_eq!(
            events[0].error.as_deref(),
            Some("vault: secret not found: missing")
        );
        assert!(sink.is_empty());
    }

    #[test]
    fn test_scope_dropped_without_outcome_records_failure() {
        let sink = MemoryAuditSink::new();
        {
            let mut scope = AuditScope::begin(&sink, AuditOperation::Put, "abandoned");
            scope.metadata("size", 4);
        }

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert!(!events[0].success);
        assert!(events[0].error.is_some());
    }

    #[test]
    fn test_closure_sink() {
        let seen = Mutex::new(Vec::new());
        let sink = |e: &AuditEvent| seen.lock().push(e.operation);
        sink.record(&AuditEvent::new(AuditOperation::Delete, "x"));
        assert_eq!(*seen.lock(), vec![AuditOperation::Delete]);
    }

    #[test]
    fn test_fanout_forwards_to_all() {
        let a = Arc::new(MemoryAuditSink::new());
        let b = Arc::new(MemoryAuditSink::new());
        let fanout = FanoutAuditSink::new(vec![a.clone(), b.clone()]);

        fanout.record(&AuditEvent::new(AuditOperation::List, ""));
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn test_jsonl_sink_appends_lines() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("audit").join("vault.jsonl");
        let sink = JsonlAuditSink::open(&path).unwrap();

        sink.record(&AuditEvent::new(AuditOperation::Put, "a"));
        sink.record(&AuditEvent::new(AuditOperation::Get, "a"));
        drop(sink);

        let content = std::fs::read_to_string(&path).unwrap();
        let ops: Vec<AuditOperation> = content
            .lines()
            .map(|l| serde_json::from_str::<AuditEvent>(l).unwrap().operation)
            .collect();
        assert_eq!(ops, vec![AuditOperation::Put, AuditOperation::Get]);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_jsonl_sink_flushes_queued_events_on_drop() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("vault.jsonl");
        let sink = JsonlAuditSink::open(&path).unwrap();

        for i in 0..200 {
            sink.record(&AuditEvent::new(AuditOperation::Put, format!("secret-{i}")));
        }
        drop(sink);

        let keys: Vec<String> = std::fs::read_to_string(&path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str::<AuditEvent>(l).unwrap().key)
            .collect();
        let expected: Vec<String> = (0..200).map(|i| format!("secret-{i}")).collect();
        assert_eq!(keys, expected);
    }

    #[cfg(unix)]
    #[test]
    fn test_jsonl_sink_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let sink = JsonlAuditSink::open(tmp.path().join("vault.jsonl")).unwrap();
        let mode = std::fs::metadata(sink.path()).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn test_sink_from_config() {
        let tmp = TempDir::new().unwrap();
        let config = VaultAuditConfig {
            enabled: false,
            log_path: Some(tmp.path().join("vault.jsonl")),
        };
        let sink = sink_from_config(&config).unwrap();
        sink.record(&AuditEvent::new(AuditOperation::Health, ""));
        assert!(tmp.path().join("vault.jsonl").exists());

        let disabled = VaultAuditConfig {
            enabled: false,
            log_path: None,
        };
        sink_from_config(&disabled).unwrap();
    }
}
