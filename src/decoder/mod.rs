//! # 图片解码模块（decoder）
//!
//! ## 设计思路
//!
//! 将“打开文件 → 分块读取 → 关闭 → 工作线程解码 → 回调交付”按职责拆分为多个子模块，
//! 单个请求的全部状态收拢在 `Request` 中，在各阶段之间按值传递，任意时刻只有一个持有者。
//!
//! - `buffer`：只追加缓冲与读取临时块
//! - `source`：异步文件系统抽象与 tokio 实现
//! - `reader`：分块读取状态机，保证句柄恰好关闭一次
//! - `codec`：不透明解码函数接口与基于 `image` 的默认实现
//! - `dispatch`：把完整缓冲派发到阻塞线程池解码
//! - `request` / `completion`：在途请求与一次性回调
//! - `handler`：对外入口 `ImageDecoder`，编排整条链路
//! - `config/error/diagnostics/init`：配置、错误、诊断计数、全局一次性初始化
//!
//! ## 新同事快速上手
//!
//! ```text
//! ImageDecoder::decode(filename, callback)
//!    ↓  spawn 到 tokio 运行时
//! reader.rs（open → read_at 循环 → close）
//!    ↓  缓冲冻结为 Bytes
//! dispatch.rs（spawn_blocking 中调用 ImageDecode）
//!    ↓
//! request.rs（Request::complete：释放资源 → 回调一次）
//! ```

mod buffer;
mod codec;
mod completion;
mod config;
mod diagnostics;
mod dispatch;
mod error;
mod handler;
pub mod init;
mod reader;
mod request;
mod source;

#[cfg(test)]
mod testing;

pub use buffer::{GrowableBuffer, ScratchChunk};
pub use codec::{DecodedImage, ImageCrateDecoder, ImageDecode};
pub use completion::DecodeResult;
pub use config::{DEFAULT_CHUNK_SIZE, DecodeSource, DecoderConfig, MAX_CHUNK_SIZE};
pub use diagnostics::{DiagnosticsSnapshot, PipelineDiagnostics};
pub use error::{CloseFailure, DecodeError, InitError};
pub use handler::ImageDecoder;
pub use init::DecodeOptions;
pub use source::{FileSystem, TokioFileSystem};
