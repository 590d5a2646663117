//! 截图存储
//! Screenshot persistence for fall alerts

use crate::detection::Frame;
use anyhow::{anyhow, Context, Result};
use image::{DynamicImage, ImageBuffer, Rgba};
use std::fs;
use std::path::PathBuf;

/// 截图存储 (外部协作方): 保存当前帧并返回可引用的路径
pub trait ScreenshotStore: Send + Sync {
    fn save(&self, frame: &Frame, label: &str) -> Result<String>;
}

/// 本地磁盘存储
///
/// 写入 <save_dir>/fall_<label>.jpg, 返回前端可访问的URL路径
/// (如 /static/fall_images/fall_<label>.jpg)。
pub struct DiskScreenshotStore {
    save_dir: PathBuf,
    url_prefix: String,
}

impl DiskScreenshotStore {
    /// 默认目录 static/fall_images
    pub fn new() -> Result<Self> {
        Self::with_dir(
            PathBuf::from("static").join("fall_images"),
            "/static/fall_images",
        )
    }

    /// 创建存储并确保目录存在
    pub fn with_dir(save_dir: PathBuf, url_prefix: &str) -> Result<Self> {
        fs::create_dir_all(&save_dir)
            .with_context(|| format!("创建截图目录失败: {}", save_dir.display()))?;
        Ok(Self {
            save_dir,
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        })
    }
}

impl ScreenshotStore for DiskScreenshotStore {
    fn save(&self, frame: &Frame, label: &str) -> Result<String> {
        let filename = format!("fall_{label}.jpg");
        let path = self.save_dir.join(&filename);

        let rgba: ImageBuffer<Rgba<u8>, Vec<u8>> =
            ImageBuffer::from_raw(frame.width, frame.height, frame.rgba_data.to_vec()).ok_or_else(
                || anyhow!("帧尺寸与数据长度不一致: {}x{}", frame.width, frame.height),
            )?;

        // JPEG不带alpha通道, 先转RGB
        let rgb = DynamicImage::ImageRgba8(rgba).to_rgb8();
        rgb.save(&path)
            .with_context(|| format!("截图写入失败: {}", path.display()))?;

        Ok(format!("{}/{}", self.url_prefix, filename))
    }
}
