//! # 诊断计数模块
//!
//! ## 设计思路
//!
//! 各阶段共享一份 `PipelineDiagnostics`，用原子计数记录打开/读取/关闭/解码次数与存活请求数。
//! 关闭失败不会进入请求结果，但会在这里留下计数与最近一次的原因，保证可观测。

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use super::CloseFailure;

/// 流水线诊断计数。
#[derive(Debug, Default)]
pub struct PipelineDiagnostics {
    requests_started: AtomicU64,
    requests_completed: AtomicU64,
    live_requests: AtomicU64,
    files_opened: AtomicU64,
    files_closed: AtomicU64,
    reads_issued: AtomicU64,
    bytes_read: AtomicU64,
    decodes_dispatched: AtomicU64,
    close_failures: AtomicU64,
    last_close_failure: Mutex<Option<String>>,
}

/// 某一时刻的诊断快照。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticsSnapshot {
    pub requests_started: u64,
    pub requests_completed: u64,
    pub live_requests: u64,
    pub files_opened: u64,
    pub files_closed: u64,
    /// 已打开但尚未关闭的句柄数。
    pub open_handles: u64,
    pub reads_issued: u64,
    pub bytes_read: u64,
    pub decodes_dispatched: u64,
    pub close_failures: u64,
    pub last_close_failure: Option<String>,
}

impl PipelineDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn request_started(&self) {
        self.requests_started.fetch_add(1, Ordering::Relaxed);
        self.live_requests.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn request_completed(&self) {
        self.requests_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn request_released(&self) {
        self.live_requests.fetch_sub(1, Ordering::SeqCst);
    }

    pub(crate) fn file_opened(&self) {
        self.files_opened.fetch_add(1, Ordering::SeqCst);
    }

    /// 句柄已交还（无论 close 本身是否报错）。
    pub(crate) fn file_closed(&self) {
        self.files_closed.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn read_issued(&self) {
        self.reads_issued.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn bytes_read(&self, n: usize) {
        self.bytes_read.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub(crate) fn decode_dispatched(&self) {
        self.decodes_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn close_failed(&self, failure: &CloseFailure) {
        self.close_failures.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_close_failure.lock() {
            *last = Some(failure.to_string());
        }
    }

    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        let files_opened = self.files_opened.load(Ordering::SeqCst);
        let files_closed = self.files_closed.load(Ordering::SeqCst);
        DiagnosticsSnapshot {
            requests_started: self.requests_started.load(Ordering::Relaxed),
            requests_completed: self.requests_completed.load(Ordering::Relaxed),
            live_requests: self.live_requests.load(Ordering::SeqCst),
            files_opened,
            files_closed,
            open_handles: files_opened.saturating_sub(files_closed),
            reads_issued: self.reads_issued.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            decodes_dispatched: self.decodes_dispatched.load(Ordering::Relaxed),
            close_failures: self.close_failures.load(Ordering::Relaxed),
            last_close_failure: self
                .last_close_failure
                .lock()
                .ok()
                .and_then(|last| last.clone()),
        }
    }
}
