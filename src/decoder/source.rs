//! # 文件来源模块
//!
//! ## 设计思路
//!
//! 读取阶段只依赖 `FileSystem` 抽象的三个异步操作：打开、按偏移读取、关闭。
//! 生产环境使用基于 `tokio::fs` 的 `TokioFileSystem`，测试可注入带计数或故障的实现。
//!
//! ## 实现思路
//!
//! - `read_at` 语义：从 `offset` 开始尽量填满 `buf`，返回值小于 `buf.len()` 即视为到达文件末尾。
//! - `close` 按值接收句柄，句柄在类型层面只能被关闭一次。

use std::future::Future;
use std::io::{self, SeekFrom};
use std::path::Path;

use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// 异步文件访问抽象。
pub trait FileSystem: Send + Sync + 'static {
    /// 已打开的文件句柄。
    type File: Send + 'static;

    fn open(&self, path: &Path) -> impl Future<Output = io::Result<Self::File>> + Send;

    fn read_at(
        &self,
        file: &mut Self::File,
        buf: &mut [u8],
        offset: u64,
    ) -> impl Future<Output = io::Result<usize>> + Send;

    fn close(&self, file: Self::File) -> impl Future<Output = io::Result<()>> + Send;
}

/// 基于 `tokio::fs` 的默认实现，阻塞调用由 tokio 的阻塞线程池承担。
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileSystem;

impl FileSystem for TokioFileSystem {
    type File = tokio::fs::File;

    async fn open(&self, path: &Path) -> io::Result<Self::File> {
        tokio::fs::File::open(path).await
    }

    async fn read_at(&self, file: &mut Self::File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        file.seek(SeekFrom::Start(offset)).await?;

        // 单次 read 可能返回不足量，循环填满以保持“短读即 EOF”的约定
        let mut filled = 0;
        while filled < buf.len() {
            match file.read(&mut buf[filled..]).await {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }

    async fn close(&self, file: Self::File) -> io::Result<()> {
        // 等待后台操作结束后释放描述符；std 不暴露 close(2) 的返回值
        let std_file = file.into_std().await;
        drop(std_file);
        Ok(())
    }
}
