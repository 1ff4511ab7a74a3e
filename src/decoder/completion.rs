//! # 完成回调模块
//!
//! ## 设计思路
//!
//! `Completion` 持有调用方回调，`deliver` 按值消费自身，
//! 因此同一请求的回调在类型层面只能被调用一次。
//! 若请求在终态之前被丢弃（例如运行时关闭），`Drop` 会记录错误日志而不是静默吞掉。

use super::DecodeError;

/// 单次请求的最终结果。
pub type DecodeResult<I> = Result<I, DecodeError>;

type Callback<I> = Box<dyn FnOnce(DecodeResult<I>) + Send + 'static>;

/// 一次性完成回调。
pub(crate) struct Completion<I> {
    request_id: u64,
    callback: Option<Callback<I>>,
}

impl<I> Completion<I> {
    pub(crate) fn new<C>(request_id: u64, callback: C) -> Self
    where
        C: FnOnce(DecodeResult<I>) + Send + 'static,
    {
        Self {
            request_id,
            callback: Some(Box::new(callback)),
        }
    }

    /// 将结果交给调用方回调。
    pub(crate) fn deliver(mut self, outcome: DecodeResult<I>) {
        if let Some(callback) = self.callback.take() {
            callback(outcome);
        }
    }
}

impl<I> Drop for Completion<I> {
    fn drop(&mut self) {
        if self.callback.is_some() {
            log::error!(
                "❌ 请求 #{} 在送达结果前被丢弃，回调未执行",
                self.request_id
            );
        }
    }
}
