//! # 分块图片解码器：库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 调用方 / 绑定层                           │
//! │     decode(filename, callback)   load(filename).await    │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↓ Result<Image, DecodeError>（恰好一次）
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↓          tokio 运行时                            │
//! │                                                          │
//! │  ┌─ reader ────── open → read_at 循环 → close            │
//! │  │   └─ buffer    只追加缓冲 + 复用临时块                 │
//! │  │                                                       │
//! │  ├─ dispatch ──── spawn_blocking + 信号量限流             │
//! │  │   └─ codec     ImageDecode（默认 image crate）         │
//! │  │                                                       │
//! │  └─ request ───── 单一持有者 → complete → 回调            │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`decoder`] | 非阻塞读取文件、工作线程解码、一次性回调交付 |
//! | [`decoder::init`] | 进程级解码选项（alpha 通道）的一次性初始化 |

pub mod decoder;

pub use decoder::{
    CloseFailure, DEFAULT_CHUNK_SIZE, DecodeError, DecodeOptions, DecodeResult, DecodeSource,
    DecodedImage, DecoderConfig, DiagnosticsSnapshot, FileSystem, ImageCrateDecoder, ImageDecode,
    ImageDecoder, InitError, TokioFileSystem,
};
