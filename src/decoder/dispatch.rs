//! # 解码派发模块
//!
//! ## 设计思路
//!
//! 解码是 CPU 密集操作，必须离开 I/O 任务，交给 tokio 的阻塞线程池执行。
//! 字节以不可变 `Bytes` 按值移入工作线程，解码期间既不会被释放也不会被修改。
//!
//! ## 实现思路
//!
//! 1. 通过信号量限制同时解码的数量
//! 2. `spawn_blocking` 中调用不透明解码函数
//! 3. 解码失败与工作线程崩溃统一映射为 `DecodeFailed`
//!
//! 降级模式 `DecodeSource::Disk` 会让解码器重新从磁盘读文件，启用时每次都会打警告。

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Semaphore;

use super::codec::ImageDecode;
use super::diagnostics::PipelineDiagnostics;
use super::{DecodeError, DecodeSource, init};

/// 解码派发器。
pub(crate) struct DecodeDispatcher<D: ImageDecode> {
    decoder: Arc<D>,
    permits: Arc<Semaphore>,
    source: DecodeSource,
    diagnostics: Arc<PipelineDiagnostics>,
}

impl<D: ImageDecode> DecodeDispatcher<D> {
    pub(crate) fn new(
        decoder: Arc<D>,
        max_concurrent: usize,
        source: DecodeSource,
        diagnostics: Arc<PipelineDiagnostics>,
    ) -> Self {
        Self {
            decoder,
            permits: Arc::new(Semaphore::new(max_concurrent)),
            source,
            diagnostics,
        }
    }

    /// 在工作线程上解码完整缓冲。
    pub(crate) async fn dispatch(&self, filename: &Path, data: Bytes) -> Result<D::Image, DecodeError> {
        let _permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|e| DecodeError::decode(format!("decode pool unavailable: {}", e)))?;

        self.diagnostics.decode_dispatched();
        let decoder = Arc::clone(&self.decoder);
        let options = init::decode_options();

        let joined = match self.source {
            DecodeSource::Memory => {
                log::debug!("🧩 提交解码任务 - {} bytes", data.len());
                tokio::task::spawn_blocking(move || decoder.decode(&data, &options)).await
            }
            DecodeSource::Disk => {
                log::warn!(
                    "⚠️ 降级模式：忽略内存缓冲（{} bytes），从磁盘重新读取 {}",
                    data.len(),
                    filename.display()
                );
                drop(data);
                let path = filename.to_path_buf();
                tokio::task::spawn_blocking(move || decoder.decode_path(&path, &options)).await
            }
        };

        match joined {
            Ok(Ok(image)) => Ok(image),
            Ok(Err(reason)) => Err(DecodeError::decode(reason)),
            Err(join_err) => Err(DecodeError::decode(format!("decode worker failed: {}", join_err))),
        }
    }
}
