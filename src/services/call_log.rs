//! Call logging
//!
//! Every `analyze`/`chat` invocation produces exactly one `CallLogRecord`,
//! handed to an injected `CallLogger`. Sinks never fail the call.

use crate::models::TokenUsage;
use crate::providers::Vendor;
use crate::utils::logging::truncate_content;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::io::AsyncWriteExt;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};

/// Log target for call records emitted through tracing
pub const CALL_LOG_TARGET: &str = "llm_calls";

/// Gateway operation that produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallOperation {
    Analyze,
    Chat,
}

impl CallOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallOperation::Analyze => "analyze",
            CallOperation::Chat => "chat",
        }
    }
}

/// Record severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallLevel {
    Info,
    Error,
}

/// One audit record per gateway invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallLogRecord {
    pub timestamp: DateTime<Utc>,
    pub provider: Vendor,
    pub operation: CallOperation,
    pub model: String,
    /// Analysis prompt, or the last user message for chat
    pub prompt: String,
    /// Returned value on success, raw vendor text on a parse failure
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub response: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error_kind: Option<String>,
    pub duration_ms: u64,
    pub success: bool,
    pub level: CallLevel,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub usage: Option<TokenUsage>,
}

impl CallLogRecord {
    pub fn success(
        provider: Vendor,
        operation: CallOperation,
        model: &str,
        prompt: String,
        response: serde_json::Value,
        usage: Option<TokenUsage>,
        duration_ms: u64,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            provider,
            operation,
            model: model.to_string(),
            prompt,
            response: Some(response),
            error: None,
            error_kind: None,
            duration_ms,
            success: true,
            level: CallLevel::Info,
            usage,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn failure(
        provider: Vendor,
        operation: CallOperation,
        model: &str,
        prompt: String,
        error: String,
        error_kind: &str,
        raw_response: Option<String>,
        duration_ms: u64,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            provider,
            operation,
            model: model.to_string(),
            prompt,
            response: raw_response.map(serde_json::Value::String),
            error: Some(error),
            error_kind: Some(error_kind.to_string()),
            duration_ms,
            success: false,
            level: CallLevel::Error,
            usage: None,
        }
    }
}

/// Destination for call records
pub trait CallLogger: Send + Sync {
    fn log(&self, record: CallLogRecord);
}

/// Emits each record as a structured tracing event
#[derive(Debug, Clone)]
pub struct TracingCallLogger {
    /// Maximum prompt characters included in the event
    pub prompt_preview_chars: usize,
}

impl TracingCallLogger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for TracingCallLogger {
    fn default() -> Self {
        Self {
            prompt_preview_chars: 200,
        }
    }
}

impl CallLogger for TracingCallLogger {
    fn log(&self, record: CallLogRecord) {
        let prompt = truncate_content(&record.prompt, self.prompt_preview_chars);
        let operation = record.operation.as_str();

        match record.level {
            CallLevel::Info => info!(
                target: CALL_LOG_TARGET,
                provider = record.provider.id(),
                operation,
                model = %record.model,
                duration_ms = record.duration_ms,
                success = record.success,
                total_tokens = record.usage.map(|usage| usage.total_tokens).unwrap_or_default(),
                prompt = %prompt,
                "LLM call succeeded"
            ),
            CallLevel::Error => error!(
                target: CALL_LOG_TARGET,
                provider = record.provider.id(),
                operation,
                model = %record.model,
                duration_ms = record.duration_ms,
                success = record.success,
                error_kind = record.error_kind.as_deref().unwrap_or_default(),
                error = record.error.as_deref().unwrap_or_default(),
                prompt = %prompt,
                "LLM call failed"
            ),
        }
    }
}

/// Appends one JSON object per line to a file
///
/// `log` only enqueues; a background task owns the file and does the writes.
#[derive(Debug)]
pub struct JsonLinesCallLogger {
    path: PathBuf,
    sender: mpsc::UnboundedSender<WriterCommand>,
}

#[derive(Debug)]
enum WriterCommand {
    Line(String),
    Flush(oneshot::Sender<()>),
}

impl JsonLinesCallLogger {
    /// Open (or create) `path` in append mode and start the writer task
    ///
    /// Must be called from within a tokio runtime.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let runtime = Handle::try_current().map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        let (sender, receiver) = mpsc::unbounded_channel();
        runtime.spawn(write_lines(tokio::fs::File::from_std(file), path.clone(), receiver));

        Ok(Self { path, sender })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolves once every record logged before this call is on disk
    pub async fn flush(&self) {
        let (done, written) = oneshot::channel();
        if self.sender.send(WriterCommand::Flush(done)).is_ok() {
            let _ = written.await;
        }
    }
}

impl CallLogger for JsonLinesCallLogger {
    fn log(&self, record: CallLogRecord) {
        let mut line = match serde_json::to_string(&record) {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to serialize call log record: {}", e);
                return;
            }
        };
        line.push('\n');

        if self.sender.send(WriterCommand::Line(line)).is_err() {
            warn!("Call log writer for {} has stopped, record dropped", self.path.display());
        }
    }
}

async fn write_lines(
    mut file: tokio::fs::File,
    path: PathBuf,
    mut receiver: mpsc::UnboundedReceiver<WriterCommand>,
) {
    while let Some(command) = receiver.recv().await {
        match command {
            WriterCommand::Line(line) => {
                let written = async {
                    file.write_all(line.as_bytes()).await?;
                    file.flush().await
                };
                if let Err(e) = written.await {
                    warn!("Failed to write call log to {}: {}", path.display(), e);
                }
            }
            WriterCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}

/// Keeps records in memory
#[derive(Debug, Default)]
pub struct MemoryCallLogger {
    records: Mutex<Vec<CallLogRecord>>,
}

impl MemoryCallLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records so far
    pub fn records(&self) -> Vec<CallLogRecord> {
        lock(&self.records).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        lock(&self.records).clear();
    }
}

impl CallLogger for MemoryCallLogger {
    fn log(&self, record: CallLogRecord) {
        lock(&self.records).push(record);
    }
}

/// Fans each record out to several sinks
#[derive(Default)]
pub struct MultiCallLogger {
    sinks: Vec<Arc<dyn CallLogger>>,
}

impl MultiCallLogger {
    pub fn new(sinks: Vec<Arc<dyn CallLogger>>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: Arc<dyn CallLogger>) {
        self.sinks.push(sink);
    }
}

impl CallLogger for MultiCallLogger {
    fn log(&self, record: CallLogRecord) {
        if let Some((last, rest)) = self.sinks.split_last() {
            for sink in rest {
                sink.log(record.clone());
            }
            last.log(record);
        }
    }
}

// A panic inside a sink must not disable logging for later calls
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
