//! # 缓冲模块
//!
//! ## 设计思路
//!
//! - `GrowableBuffer`：只追加的连续缓冲，读取阶段不断增长，交给解码前冻结为只读 `Bytes`。
//! - `ScratchChunk`：固定大小的临时块，每次读取复用，避免每块重新分配。
//!
//! ## 实现思路
//!
//! 两者都通过 `try_reserve` 申请内存，分配失败不会直接中止进程：
//! 临时块在打开后、读取前分配，失败记为 `DecodeError::OutOfMemory`；
//! 缓冲扩容发生在读取循环中，失败记为读取阶段的 `ReadFailed`（原因 `not enough memory`）。`Vec` 的 `try_reserve` 按倍增策略扩容，多次追加的总拷贝量为线性。

use bytes::Bytes;

use super::DecodeError;

/// 只追加的连续字节缓冲。
#[derive(Debug, Default)]
pub struct GrowableBuffer {
    bytes: Vec<u8>,
}

impl GrowableBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加 `chunk` 的前 `chunk_len` 个字节。
    ///
    /// `chunk_len` 超过 `chunk.len()` 时按实际长度截断。
    pub fn append(&mut self, chunk: &[u8], chunk_len: usize) -> Result<(), DecodeError> {
        let data = &chunk[..chunk_len.min(chunk.len())];
        if data.is_empty() {
            return Ok(());
        }
        self.reserve(data.len())?;
        self.bytes.extend_from_slice(data);
        Ok(())
    }

    /// 预留至少 `additional` 字节的空间。
    pub(crate) fn reserve(&mut self, additional: usize) -> Result<(), DecodeError> {
        self.bytes
            .try_reserve(additional)
            .map_err(|_| DecodeError::read_out_of_memory())
    }

    /// 已追加的总字节数。
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// 连续只读视图，仅在缓冲存活期间有效。
    pub fn as_contiguous_view(&self) -> &[u8] {
        &self.bytes
    }

    /// 冻结为不可变 `Bytes`，之后无法再修改。
    pub fn freeze(self) -> Bytes {
        Bytes::from(self.bytes)
    }
}

/// 固定大小的读取临时块。
#[derive(Debug)]
pub struct ScratchChunk {
    block: Vec<u8>,
}

impl ScratchChunk {
    /// 分配 `len` 字节的临时块。
    pub fn allocate(len: usize) -> Result<Self, DecodeError> {
        let mut block = Vec::new();
        block
            .try_reserve_exact(len)
            .map_err(|_| DecodeError::OutOfMemory)?;
        block.resize(len, 0);
        Ok(Self { block })
    }

    pub fn len(&self) -> usize {
        self.block.len()
    }

    pub fn is_empty(&self) -> bool {
        self.block.is_empty()
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.block
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.block
    }
}
