//! 视频输入接口
//! Frame source interface
//!
//! 真实部署由摄像头/RTSP解码线程实现取帧; 本crate只约定接口,
//! 并内置一个演示与测试用的合成信号源。

use crate::detection::Frame;
use rand::Rng;
use std::sync::Arc;

/// 帧来源 (外部协作方)
///
/// 取不到帧时返回None; 实现方可以在next_frame内阻塞等待下一帧。
pub trait FrameSource {
    fn next_frame(&mut self) -> Option<Frame>;
}

// ========== 合成信号源 ==========

/// 合成摄像头: 生成带噪声的灰底帧
pub struct SyntheticCamera {
    width: u32,
    height: u32,
    frame_count: u64,
}

impl SyntheticCamera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frame_count: 0,
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl FrameSource for SyntheticCamera {
    fn next_frame(&mut self) -> Option<Frame> {
        self.frame_count += 1;
        let mut rng = rand::thread_rng();
        let mut rgba = vec![0u8; (self.width * self.height * 4) as usize];
        for px in rgba.chunks_exact_mut(4) {
            let v = rng.gen_range(96u8..128u8);
            px[0] = v;
            px[1] = v;
            px[2] = v;
            px[3] = 255;
        }
        Some(Frame {
            rgba_data: Arc::new(rgba),
            width: self.width,
            height: self.height,
        })
    }
}
