//! # 配置模块
//!
//! ## 设计思路
//!
//! 把读取粒度、解码并发上限、解码来源集中到 `DecoderConfig`，
//! 构造解码器时整体校验一次，之后在请求链路中只读。
//!
//! ## 实现思路
//!
//! - `Default` 提供可直接用于生产的参数。
//! - `validate` 负责范围校验，错误统一为 `InitError::InvalidConfig`。
//! - `from_json_str` 支持从 JSON 片段加载，未出现的字段取默认值。

use serde::{Deserialize, Serialize};

use super::InitError;

/// 默认读取块大小（64 KiB）。
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// 单块读取上限，避免一次性分配过大的临时缓冲。
pub const MAX_CHUNK_SIZE: usize = 16 * 1024 * 1024;

const MAX_CONCURRENT_DECODES: usize = 1024;

/// 解码器读取字节的来源。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeSource {
    /// 从内存中拼装完成的缓冲解码（唯一受支持的常规路径）。
    #[default]
    Memory,
    /// 降级模式：解码器忽略缓冲，重新从磁盘读取文件。
    ///
    /// 仅用于解码库无法接收内存输入的环境，启用时每次解码都会记录警告。
    Disk,
}

/// 解码流水线配置。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// 单次读取的字节数。
    pub chunk_size: usize,
    /// 同时在工作线程上执行的解码数量上限。
    pub max_concurrent_decodes: usize,
    /// 解码来源策略。
    pub decode_source: DecodeSource,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_concurrent_decodes: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            decode_source: DecodeSource::Memory,
        }
    }
}

impl DecoderConfig {
    /// 校验参数范围。
    pub fn validate(&self) -> Result<(), InitError> {
        if !(1..=MAX_CHUNK_SIZE).contains(&self.chunk_size) {
            return Err(InitError::InvalidConfig(format!(
                "chunk_size 必须在 1~{} 字节之间（当前：{}）",
                MAX_CHUNK_SIZE, self.chunk_size
            )));
        }
        if !(1..=MAX_CONCURRENT_DECODES).contains(&self.max_concurrent_decodes) {
            return Err(InitError::InvalidConfig(format!(
                "max_concurrent_decodes 必须在 1~{} 之间（当前：{}）",
                MAX_CONCURRENT_DECODES, self.max_concurrent_decodes
            )));
        }
        Ok(())
    }

    /// 从 JSON 加载配置并校验。
    ///
    /// # 示例
    /// ```rust,ignore
    /// use chunked_image_decoder::DecoderConfig;
    ///
    /// let config = DecoderConfig::from_json_str(r#"{ "chunk_size": 4096 }"#)?;
    /// assert_eq!(config.chunk_size, 4096);
    /// # Ok::<(), chunked_image_decoder::InitError>(())
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, InitError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}
