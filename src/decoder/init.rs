//! # 全局一次性初始化
//!
//! 进程级解码选项（是否保留 alpha 通道）只允许设置一次。
//! 首次设置生效，后续调用为空操作；未显式初始化时，第一次读取会按默认值（保留 alpha）落定。

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

static GLOBAL_DECODE_OPTIONS: OnceCell<DecodeOptions> = OnceCell::new();

/// 进程级解码选项。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeOptions {
    /// 为 `false` 时解码结果会丢弃 alpha 通道。
    pub preserve_alpha: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            preserve_alpha: true,
        }
    }
}

/// 以默认选项初始化（保留 alpha 通道）。
///
/// 返回本次调用是否真正生效。
pub fn initialize() -> bool {
    initialize_with(DecodeOptions::default())
}

/// 以指定选项初始化，重复调用不会覆盖首次设置。
pub fn initialize_with(options: DecodeOptions) -> bool {
    let mut applied = false;
    GLOBAL_DECODE_OPTIONS.get_or_init(|| {
        applied = true;
        options
    });
    if applied {
        log::info!("🔧 解码全局选项已初始化：preserve_alpha={}", options.preserve_alpha);
    } else {
        log::debug!("解码全局选项已存在，忽略重复初始化");
    }
    applied
}

/// 当前生效的全局解码选项。
pub fn decode_options() -> DecodeOptions {
    *GLOBAL_DECODE_OPTIONS.get_or_init(DecodeOptions::default)
}
