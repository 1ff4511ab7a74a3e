//! # 解码函数模块
//!
//! ## 设计思路
//!
//! 流水线把像素解码视为黑盒：输入完整字节，输出图像或失败原因。
//! `ImageDecode` 即该黑盒的接口，默认实现 `ImageCrateDecoder` 基于 `image` crate。
//!
//! ## 实现思路
//!
//! 1. 空缓冲直接失败
//! 2. `infer` 识别到非图片类型时给出明确原因
//! 3. `ImageReader` 猜测格式并完整解码
//! 4. 按全局选项决定是否丢弃 alpha 通道

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, GenericImageView, ImageReader};

use super::DecodeOptions;

/// 不透明解码函数。
///
/// 在阻塞工作线程上调用，实现可以执行任意 CPU 密集操作。
pub trait ImageDecode: Send + Sync + 'static {
    /// 解码成功后的图像句柄。
    type Image: Send + 'static;

    /// 从内存字节解码。失败时返回人类可读的原因。
    fn decode(&self, data: &[u8], options: &DecodeOptions) -> Result<Self::Image, String>;

    /// 降级模式：直接从磁盘读取并解码。
    fn decode_path(&self, path: &Path, options: &DecodeOptions) -> Result<Self::Image, String> {
        let data = std::fs::read(path).map_err(|e| e.to_string())?;
        self.decode(&data, options)
    }
}

/// 解码后的图像。
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// 输出是否带 alpha 通道。
    pub has_alpha: bool,
    pub image: DynamicImage,
}

impl DecodedImage {
    fn from_dynamic(image: DynamicImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            has_alpha: image.color().has_alpha(),
            image,
        }
    }

    /// 转为 RGBA8 原始像素（`width * height * 4`）。
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.image.to_rgba8().into_raw()
    }
}

/// 基于 `image` crate 的默认解码器。
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateDecoder;

impl ImageDecode for ImageCrateDecoder {
    type Image = DecodedImage;

    fn decode(&self, data: &[u8], options: &DecodeOptions) -> Result<DecodedImage, String> {
        if data.is_empty() {
            return Err("image data is empty".to_string());
        }

        if let Some(kind) = infer::get(data) {
            if kind.matcher_type() != infer::MatcherType::Image {
                return Err(format!("not an image ({})", kind.mime_type()));
            }
        }

        let decoded = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| e.to_string())?
            .decode()
            .map_err(|e| e.to_string())?;

        let decoded = if !options.preserve_alpha && decoded.color().has_alpha() {
            DynamicImage::ImageRgb8(decoded.to_rgb8())
        } else {
            decoded
        };

        Ok(DecodedImage::from_dynamic(decoded))
    }
}
