//! 测试用的内存文件系统与计数解码器。

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::codec::ImageDecode;
use super::init::DecodeOptions;
use super::source::FileSystem;

#[derive(Debug, Default)]
pub(crate) struct FsCounters {
    opens: AtomicUsize,
    reads: AtomicUsize,
    closes: AtomicUsize,
    read_lengths: Mutex<Vec<usize>>,
}

impl FsCounters {
    pub(crate) fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub(crate) fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub(crate) fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub(crate) fn read_lengths(&self) -> Vec<usize> {
        self.read_lengths.lock().expect("read_lengths poisoned").clone()
    }
}

pub(crate) struct MemoryFile {
    data: Arc<Vec<u8>>,
}

/// 内存文件系统，可注入读取或关闭失败。
#[derive(Default)]
pub(crate) struct MemoryFs {
    files: HashMap<PathBuf, Arc<Vec<u8>>>,
    fail_read_on_call: Option<usize>,
    fail_close: bool,
    counters: Arc<FsCounters>,
}

impl MemoryFs {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_file(mut self, name: &str, data: Vec<u8>) -> Self {
        self.files.insert(PathBuf::from(name), Arc::new(data));
        self
    }

    /// 第 `call` 次（从 1 开始）读取返回错误。
    pub(crate) fn fail_read_on_call(mut self, call: usize) -> Self {
        self.fail_read_on_call = Some(call);
        self
    }

    pub(crate) fn fail_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub(crate) fn counters(&self) -> &FsCounters {
        &self.counters
    }
}

impl FileSystem for MemoryFs {
    type File = MemoryFile;

    async fn open(&self, path: &Path) -> io::Result<MemoryFile> {
        self.counters.opens.fetch_add(1, Ordering::SeqCst);
        self.files
            .get(path)
            .map(|data| MemoryFile {
                data: Arc::clone(data),
            })
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file or directory"))
    }

    async fn read_at(&self, file: &mut MemoryFile, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let call = self.counters.reads.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_read_on_call == Some(call) {
            return Err(io::Error::other("injected read failure"));
        }

        let start = (offset as usize).min(file.data.len());
        let len = buf.len().min(file.data.len() - start);
        buf[..len].copy_from_slice(&file.data[start..start + len]);
        self.counters
            .read_lengths
            .lock()
            .expect("read_lengths poisoned")
            .push(len);
        Ok(len)
    }

    async fn close(&self, _file: MemoryFile) -> io::Result<()> {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            return Err(io::Error::other("injected close failure"));
        }
        Ok(())
    }
}

/// 记录调用次数与输入长度的解码器：非空输入即成功，返回字节数。
#[derive(Default)]
pub(crate) struct CountingDecoder {
    calls: AtomicUsize,
    path_calls: AtomicUsize,
    panic_on_decode: bool,
}

impl CountingDecoder {
    pub(crate) fn panicking() -> Self {
        Self {
            panic_on_decode: true,
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn path_calls(&self) -> usize {
        self.path_calls.load(Ordering::SeqCst)
    }
}

impl ImageDecode for CountingDecoder {
    type Image = usize;

    fn decode(&self, data: &[u8], _options: &DecodeOptions) -> Result<usize, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.panic_on_decode {
            panic!("decoder exploded");
        }
        if data.is_empty() {
            return Err("image data is empty".to_string());
        }
        Ok(data.len())
    }

    fn decode_path(&self, path: &Path, options: &DecodeOptions) -> Result<usize, String> {
        self.path_calls.fetch_add(1, Ordering::SeqCst);
        let data = std::fs::read(path).map_err(|e| e.to_string())?;
        self.decode(&data, options)
    }
}
