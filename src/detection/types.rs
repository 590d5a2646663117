use std::sync::Arc;
/// 跌倒检测系统数据结构定义
/// Data structures for the fall detection system
use chrono::{DateTime, Local};
use serde::Serialize;

use crate::{gen_time_display, gen_time_label};

// ========== 数据结构 ==========

/// 已解码帧 (采集协作方 → 检测线程)
#[derive(Clone)]
pub struct Frame {
    pub rgba_data: Arc<Vec<u8>>, // 使用Arc共享数据,避免复制
    pub width: u32,
    pub height: u32,
}

/// 姿态关键点 (Pose keypoints)
#[derive(Clone, Debug, PartialEq)]
pub struct PoseKeypoints {
    pub points: Vec<(f32, f32, f32)>, // (x, y, confidence)
}

impl PoseKeypoints {
    /// 取某个关键点的(x, y); 下标越界或坐标非有限值时返回None
    pub fn point(&self, index: usize) -> Option<(f32, f32)> {
        let (x, y, _) = *self.points.get(index)?;
        if x.is_finite() && y.is_finite() {
            Some((x, y))
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// 跌倒事件 (推送给订阅者的载荷, 字段名与前端约定一致)
#[derive(Clone, Debug, Serialize)]
pub struct FallEvent {
    #[serde(rename = "type")]
    pub event_type: &'static str,
    pub timestamp: String,
    pub image_path: String,
    pub fall_id: String,
    pub confidence: f32,
    pub consecutive_falls: u32,
}

impl FallEvent {
    pub const EVENT_TYPE: &'static str = "fall_detected";

    /// 在告警时刻构造事件; fall_id由时间戳派生
    pub fn new(
        at: DateTime<Local>,
        image_path: String,
        confidence: f32,
        consecutive_falls: u32,
    ) -> Self {
        Self {
            event_type: Self::EVENT_TYPE,
            timestamp: gen_time_display(at),
            fall_id: format!("fall_{}", gen_time_label(at)),
            image_path,
            confidence,
            consecutive_falls,
        }
    }
}
