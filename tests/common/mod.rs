//! 集成测试共用的计数文件系统与解码器。

#![allow(dead_code)]

use std::io;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use chunked_image_decoder::{DecodeOptions, FileSystem, ImageDecode, TokioFileSystem};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// 包装 `TokioFileSystem`，记录每次调用并可注入读取失败。
#[derive(Default)]
pub struct CountingFs {
    inner: TokioFileSystem,
    opens: AtomicUsize,
    reads: AtomicUsize,
    closes: AtomicUsize,
    read_lengths: Mutex<Vec<usize>>,
    fail_read_on_call: Option<usize>,
}

impl CountingFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_read_on_call(call: usize) -> Self {
        Self {
            fail_read_on_call: Some(call),
            ..Self::default()
        }
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn read_lengths(&self) -> Vec<usize> {
        self.read_lengths.lock().expect("read_lengths poisoned").clone()
    }
}

impl FileSystem for CountingFs {
    type File = <TokioFileSystem as FileSystem>::File;

    async fn open(&self, path: &Path) -> io::Result<Self::File> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.inner.open(path).await
    }

    async fn read_at(&self, file: &mut Self::File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let call = self.reads.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_read_on_call == Some(call) {
            return Err(io::Error::other("device unplugged"));
        }
        let n = self.inner.read_at(file, buf, offset).await?;
        self.read_lengths.lock().expect("read_lengths poisoned").push(n);
        Ok(n)
    }

    async fn close(&self, file: Self::File) -> io::Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.inner.close(file).await
    }
}

/// 非空输入即视为合法图像，记录收到的缓冲长度。
#[derive(Default)]
pub struct RecordingDecoder {
    received: Mutex<Vec<usize>>,
}

impl RecordingDecoder {
    pub fn received(&self) -> Vec<usize> {
        self.received.lock().expect("received poisoned").clone()
    }
}

impl ImageDecode for RecordingDecoder {
    type Image = Vec<u8>;

    fn decode(&self, data: &[u8], _options: &DecodeOptions) -> Result<Vec<u8>, String> {
        self.received.lock().expect("received poisoned").push(data.len());
        if data.is_empty() {
            return Err("image data is empty".to_string());
        }
        Ok(data.to_vec())
    }
}
