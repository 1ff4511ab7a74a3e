//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `ImageDecoder` 只负责创建请求并按固定顺序推进：
//! 1. 分块读取（打开 → 读取循环 → 关闭）
//! 2. 冻结缓冲并派发到工作线程解码
//! 3. 终态交付回调并释放请求
//!
//! ## 实现思路
//!
//! - 构造时捕获 tokio 运行时句柄，之后 `decode` 可以在任意线程调用且立即返回。
//! - 每个请求是独立的 tokio 任务，请求之间没有共享的可变状态。
//! - 任一阶段失败都直接跳到终态，不会出现部分成功。

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::codec::{ImageCrateDecoder, ImageDecode};
use super::completion::{Completion, DecodeResult};
use super::diagnostics::{DiagnosticsSnapshot, PipelineDiagnostics};
use super::dispatch::DecodeDispatcher;
use super::reader::ChunkedFileReader;
use super::request::{Request, Stage};
use super::source::{FileSystem, TokioFileSystem};
use super::{DecodeError, DecoderConfig, InitError, init};

struct Shared<D: ImageDecode, F: FileSystem> {
    config: DecoderConfig,
    reader: ChunkedFileReader<F>,
    dispatcher: DecodeDispatcher<D>,
    diagnostics: Arc<PipelineDiagnostics>,
    next_request_id: AtomicU64,
}

/// 非阻塞图片解码器。
pub struct ImageDecoder<D: ImageDecode = ImageCrateDecoder, F: FileSystem = TokioFileSystem> {
    shared: Arc<Shared<D, F>>,
    runtime: Handle,
}

impl<D: ImageDecode, F: FileSystem> Clone for ImageDecoder<D, F> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            runtime: self.runtime.clone(),
        }
    }
}

impl ImageDecoder {
    /// 使用默认解码器与 tokio 文件系统创建。
    ///
    /// 必须在 tokio 运行时上下文中调用。
    ///
    /// # 示例
    /// ```rust,ignore
    /// use chunked_image_decoder::{DecoderConfig, ImageDecoder};
    ///
    /// # async fn demo() -> Result<(), chunked_image_decoder::InitError> {
    /// let decoder = ImageDecoder::new(DecoderConfig::default())?;
    /// decoder.decode("photo.png", |result| match result {
    ///     Ok(image) => println!("{}x{}", image.width, image.height),
    ///     Err(err) => eprintln!("{err}"),
    /// });
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: DecoderConfig) -> Result<Self, InitError> {
        Self::with_parts(config, Arc::new(ImageCrateDecoder), Arc::new(TokioFileSystem))
    }
}

impl<D: ImageDecode, F: FileSystem> ImageDecoder<D, F> {
    /// 注入自定义解码器与文件系统，运行时取当前上下文。
    pub fn with_parts(config: DecoderConfig, decoder: Arc<D>, fs: Arc<F>) -> Result<Self, InitError> {
        let runtime = Handle::try_current().map_err(|e| InitError::NoRuntime(e.to_string()))?;
        Self::with_runtime(config, decoder, fs, runtime)
    }

    /// 显式指定运行时句柄，适合在运行时之外的线程构造。
    pub fn with_runtime(
        config: DecoderConfig,
        decoder: Arc<D>,
        fs: Arc<F>,
        runtime: Handle,
    ) -> Result<Self, InitError> {
        config.validate()?;
        init::initialize();

        let diagnostics = Arc::new(PipelineDiagnostics::new());
        let reader = ChunkedFileReader::new(fs, config.chunk_size, Arc::clone(&diagnostics));
        let dispatcher = DecodeDispatcher::new(
            decoder,
            config.max_concurrent_decodes,
            config.decode_source,
            Arc::clone(&diagnostics),
        );

        log::info!(
            "⚙️ 图片解码器已创建（chunk_size={}, max_concurrent_decodes={}, decode_source={:?}）",
            config.chunk_size,
            config.max_concurrent_decodes,
            config.decode_source
        );

        Ok(Self {
            shared: Arc::new(Shared {
                config,
                reader,
                dispatcher,
                diagnostics,
                next_request_id: AtomicU64::new(1),
            }),
            runtime,
        })
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.shared.config
    }

    pub fn diagnostics(&self) -> DiagnosticsSnapshot {
        self.shared.diagnostics.snapshot()
    }

    /// 发起一次解码，立即返回。
    ///
    /// `callback` 在终态时恰好调用一次。返回的 `JoinHandle` 在回调执行完、
    /// 请求资源全部释放后完成。
    ///
    /// “恰好一次”以运行时仍在运行为前提：若构造时捕获的运行时已关闭，
    /// 任务不会被执行，请求随之丢弃，回调不会触发，只会留下一条错误日志。
    pub fn decode<C>(&self, filename: impl Into<PathBuf>, callback: C) -> JoinHandle<()>
    where
        C: FnOnce(DecodeResult<D::Image>) + Send + 'static,
    {
        let id = self.shared.next_request_id.fetch_add(1, Ordering::Relaxed);
        let filename = filename.into();
        log::info!("🖼️ 请求 #{} 开始解码 - 文件: {}", id, filename.display());

        let request = Request::new(
            id,
            filename,
            Completion::new(id, callback),
            Arc::clone(&self.shared.diagnostics),
        );

        let shared = Arc::clone(&self.shared);
        self.runtime.spawn(async move {
            let mut request = request;
            let outcome = shared.execute(&mut request).await;
            request.complete(outcome);
        })
    }

    /// `decode` 的异步形式。
    pub async fn load(&self, filename: impl Into<PathBuf>) -> DecodeResult<D::Image> {
        let (tx, rx) = oneshot::channel();
        let task = self.decode(filename, move |outcome| {
            let _ = tx.send(outcome);
        });

        match rx.await {
            Ok(outcome) => outcome,
            Err(_) => {
                let reason = match task.await {
                    Err(join_err) => format!("request task failed: {}", join_err),
                    Ok(()) => "request finished without a result".to_string(),
                };
                Err(DecodeError::decode(reason))
            }
        }
    }
}

impl<D: ImageDecode, F: FileSystem> Shared<D, F> {
    async fn execute(&self, request: &mut Request<D::Image>) -> DecodeResult<D::Image> {
        self.reader.read(request).await?;

        request.enter(Stage::Decoding);
        let data = request.seal_buffer();
        log::debug!(
            "请求 #{} 缓冲已冻结 - {} bytes",
            request.id(),
            data.len()
        );
        self.dispatcher.dispatch(request.filename(), data).await
    }
}
