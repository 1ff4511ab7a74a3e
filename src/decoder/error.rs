//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 请求的终态错误只有四类：打开失败、内存不足、读取失败、解码失败。
//! 使用单一枚举承载，调用侧可按分支匹配，`Display` 输出统一为
//! `"<阶段描述>: <原因>."`，直接作为对外可见的错误消息。
//!
//! 关闭文件失败不属于请求结果，单独建模为 [`CloseFailure`]，只进入日志与诊断计数。
//! 构造期错误（配置非法、缺少运行时）与请求结果无关，归入 [`InitError`]。

/// 单次解码请求的终态错误。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// 文件无法打开（不存在、无权限等），后续阶段均不执行。
    #[error("Error opening file: {reason}.")]
    OpenFailed { reason: String },

    /// 打开成功后分配读取缓冲失败；已打开的句柄仍会被关闭。
    #[error("Error opening file: not enough memory.")]
    OutOfMemory,

    /// 读取中途失败；句柄仍会被关闭，已读部分丢弃。
    #[error("Error reading file: {reason}.")]
    ReadFailed { reason: String },

    /// 解码器未能从完整字节中产出图像（损坏、截断、格式不支持）。
    #[error("Error decoding file: {reason}.")]
    DecodeFailed { reason: String },
}

impl DecodeError {
    pub(crate) fn open(err: &std::io::Error) -> Self {
        Self::OpenFailed {
            reason: err.to_string(),
        }
    }

    pub(crate) fn read(err: &std::io::Error) -> Self {
        Self::ReadFailed {
            reason: err.to_string(),
        }
    }

    /// 读取循环中缓冲扩容失败。
    pub(crate) fn read_out_of_memory() -> Self {
        Self::ReadFailed {
            reason: "not enough memory".to_string(),
        }
    }

    pub(crate) fn decode(reason: impl Into<String>) -> Self {
        Self::DecodeFailed {
            reason: reason.into(),
        }
    }

    /// 失败所处阶段的稳定标识，用于日志字段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::OpenFailed { .. } | Self::OutOfMemory => "open",
            Self::ReadFailed { .. } => "read",
            Self::DecodeFailed { .. } => "decode",
        }
    }
}

/// 关闭文件失败的诊断记录。
///
/// 永远不会覆盖请求结果，只用于日志与 [`super::DiagnosticsSnapshot`]。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Error closing file: {reason}.")]
pub struct CloseFailure {
    pub reason: String,
}

/// 构造解码器时的错误。
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("配置无效：{0}")]
    InvalidConfig(String),

    #[error("配置解析失败：{0}")]
    Parse(#[from] serde_json::Error),

    #[error("当前线程没有可用的 tokio 运行时：{0}")]
    NoRuntime(String),
}

impl From<DecodeError> for String {
    /// 绑定层只需要消息文本时使用。
    fn from(error: DecodeError) -> Self {
        error.to_string()
    }
}
