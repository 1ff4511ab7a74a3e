//! # 在途请求模块
//!
//! ## 设计思路
//!
//! 一次解码调用的全部状态都收拢在 `Request` 中，由各阶段按值或独占借用依次传递，
//! 任意时刻只有一个阶段持有它，不需要加锁。
//!
//! 终态只有一个入口 `Request::complete(self, ..)`：先释放临时块与缓冲，再交付回调，
//! 最后释放请求记录本身。由于它按值消费请求，重复回调与重复释放在编译期不可达。

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;

use super::buffer::{GrowableBuffer, ScratchChunk};
use super::completion::{Completion, DecodeResult};
use super::diagnostics::PipelineDiagnostics;

/// 请求所处阶段，只能向前推进。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Stage {
    Opening,
    Reading,
    Closing,
    Decoding,
}

/// 存活请求计数守卫，随请求记录一同释放。
struct LiveRequest {
    diagnostics: Arc<PipelineDiagnostics>,
}

impl LiveRequest {
    fn new(diagnostics: Arc<PipelineDiagnostics>) -> Self {
        diagnostics.request_started();
        Self { diagnostics }
    }
}

impl Drop for LiveRequest {
    fn drop(&mut self) {
        self.diagnostics.request_released();
    }
}

/// 单次解码请求。
pub(crate) struct Request<I> {
    id: u64,
    filename: PathBuf,
    stage: Stage,
    buffer: GrowableBuffer,
    scratch: Option<ScratchChunk>,
    completion: Completion<I>,
    live: LiveRequest,
    started_at: Instant,
}

impl<I> Request<I> {
    pub(crate) fn new(
        id: u64,
        filename: PathBuf,
        completion: Completion<I>,
        diagnostics: Arc<PipelineDiagnostics>,
    ) -> Self {
        Self {
            id,
            filename,
            stage: Stage::Opening,
            buffer: GrowableBuffer::new(),
            scratch: None,
            completion,
            live: LiveRequest::new(diagnostics),
            started_at: Instant::now(),
        }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn filename(&self) -> &Path {
        &self.filename
    }

    #[cfg(test)]
    pub(crate) fn stage(&self) -> Stage {
        self.stage
    }

    pub(crate) fn enter(&mut self, next: Stage) {
        debug_assert!(next > self.stage, "stage must advance: {:?} -> {:?}", self.stage, next);
        log::debug!("请求 #{} 阶段切换：{:?} -> {:?}", self.id, self.stage, next);
        self.stage = next;
    }

    #[cfg(test)]
    pub(crate) fn buffer(&self) -> &GrowableBuffer {
        &self.buffer
    }

    /// 安装临时块，同时借出缓冲供读取循环使用。
    pub(crate) fn install_scratch(&mut self, scratch: ScratchChunk) -> (&mut ScratchChunk, &mut GrowableBuffer) {
        let scratch = self.scratch.insert(scratch);
        (scratch, &mut self.buffer)
    }

    pub(crate) fn release_scratch(&mut self) {
        self.scratch = None;
    }

    /// 冻结缓冲交给解码器，之后请求内不再保留字节。
    pub(crate) fn seal_buffer(&mut self) -> Bytes {
        std::mem::take(&mut self.buffer).freeze()
    }

    /// 终态：释放资源并交付结果。
    pub(crate) fn complete(self, outcome: DecodeResult<I>) {
        let Self {
            id,
            filename,
            stage,
            buffer,
            scratch,
            completion,
            live,
            started_at,
        } = self;

        drop(scratch);
        drop(buffer);

        let elapsed = started_at.elapsed().as_millis();
        match &outcome {
            Ok(_) => log::info!(
                "✅ 请求 #{} 完成 - 文件: {} 耗时={}ms",
                id,
                filename.display(),
                elapsed
            ),
            Err(err) => log::warn!(
                "⚠️ 请求 #{} 失败 - 文件: {} 阶段: {} ({:?}) 耗时={}ms 错误: {}",
                id,
                filename.display(),
                err.stage(),
                stage,
                elapsed,
                err
            ),
        }

        live.diagnostics.request_completed();
        completion.deliver(outcome);
        drop(live);
    }
}
