//! # 分块读取模块
//!
//! ## 设计思路
//!
//! 状态流转：`Opening → Reading → Closing → 终态`。
//! 打开失败直接进入终态，不存在需要关闭的句柄；只要打开成功，
//! 无论后续是内存不足、读取失败还是正常读完，句柄都恰好关闭一次。
//!
//! ## 实现思路
//!
//! - 句柄由本阶段局部持有，`close` 按值消费，重复关闭在类型层面不可达。
//! - 读取偏移直接取缓冲当前长度，不单独维护游标。
//! - 读满一块则继续读；不足一块（包括 0 字节）即视为 EOF。
//!   文件大小恰为块大小整数倍时会多出一次 0 字节读取，属于预期行为。
//! - 关闭失败只记录日志与诊断计数，不改变已确定的结果。

use std::sync::Arc;

use super::buffer::ScratchChunk;
use super::diagnostics::PipelineDiagnostics;
use super::request::{Request, Stage};
use super::source::FileSystem;
use super::{CloseFailure, DecodeError};

/// 分块文件读取器。
pub(crate) struct ChunkedFileReader<F: FileSystem> {
    fs: Arc<F>,
    chunk_size: usize,
    diagnostics: Arc<PipelineDiagnostics>,
}

impl<F: FileSystem> ChunkedFileReader<F> {
    pub(crate) fn new(fs: Arc<F>, chunk_size: usize, diagnostics: Arc<PipelineDiagnostics>) -> Self {
        Self {
            fs,
            chunk_size,
            diagnostics,
        }
    }

    /// 打开文件并把全部字节读入请求缓冲。
    ///
    /// 返回时文件句柄（若曾打开）已关闭，临时块已释放。
    pub(crate) async fn read<I>(&self, request: &mut Request<I>) -> Result<(), DecodeError> {
        log::debug!(
            "📁 请求 #{} 打开文件 - 路径: {}",
            request.id(),
            request.filename().display()
        );

        let mut file = self
            .fs
            .open(request.filename())
            .await
            .map_err(|e| DecodeError::open(&e))?;
        self.diagnostics.file_opened();

        request.enter(Stage::Reading);
        let result = match ScratchChunk::allocate(self.chunk_size) {
            Ok(scratch) => self.read_loop(request, &mut file, scratch).await,
            Err(err) => Err(err),
        };

        request.enter(Stage::Closing);
        self.close_quietly(request.id(), file).await;
        request.release_scratch();

        result
    }

    async fn read_loop<I>(
        &self,
        request: &mut Request<I>,
        file: &mut F::File,
        scratch: ScratchChunk,
    ) -> Result<(), DecodeError> {
        let id = request.id();
        let (scratch, buffer) = request.install_scratch(scratch);
        let chunk_size = scratch.len();

        loop {
            let offset = buffer.size() as u64;
            self.diagnostics.read_issued();

            let read = self
                .fs
                .read_at(file, scratch.as_mut_slice(), offset)
                .await
                .map_err(|e| DecodeError::read(&e))?
                .min(chunk_size);

            buffer.append(scratch.as_slice(), read)?;
            self.diagnostics.bytes_read(read);
            log::trace!("请求 #{} 读取 offset={} len={}", id, offset, read);

            if read < chunk_size {
                break;
            }
        }

        log::debug!("📦 请求 #{} 读取完成 - {} bytes", id, buffer.size());
        Ok(())
    }

    async fn close_quietly(&self, request_id: u64, file: F::File) {
        let result = self.fs.close(file).await;
        self.diagnostics.file_closed();

        if let Err(err) = result {
            let failure = CloseFailure {
                reason: err.to_string(),
            };
            log::warn!("⚠️ 请求 #{} 关闭文件失败（不影响结果）：{}", request_id, failure);
            self.diagnostics.close_failed(&failure);
        }
    }
}
