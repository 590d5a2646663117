pub mod broadcast; // 跌倒事件广播
pub mod control; // 控制入口 (请求式/Socket式)
pub mod detection; // 跌倒检测系统
pub mod fall_log; // 跌倒日志
pub mod input; // 视频输入接口
pub mod models; // 姿态模型接口与具体实现
pub mod session; // 检测会话生命周期
pub mod storage; // 截图存储

pub use crate::broadcast::{EventBroadcaster, FALL_CHANNEL};
pub use crate::detection::{
    ClassifierConfig, DebounceDecision, DetectionContext, FallClassifier, FallDebouncer,
    FallEvent, Frame, PoseHistory, PoseKeypoints, WorkerConfig,
};
pub use crate::fall_log::{FallLog, FallLogEntry};
pub use crate::session::{SessionController, StartOutcome, StopOutcome};

// COCO-17 关键点索引: 0-鼻子, 5-左肩, 6-右肩, 11-左髋, 12-右髋
pub const KP_NOSE: usize = 0;
pub const KP_LEFT_SHOULDER: usize = 5;
pub const KP_RIGHT_SHOULDER: usize = 6;
pub const KP_LEFT_HIP: usize = 11;
pub const KP_RIGHT_HIP: usize = 12;

/// 参与判定所需的最少关键点数, 不足则跳过该目标
pub const MIN_KEYPOINTS: usize = 13;

/// 文件名/事件ID用时间戳 (fall_2025-01-01_12-00-00.jpg)
pub fn gen_time_label(t: chrono::DateTime<chrono::Local>) -> String {
    t.format("%Y-%m-%d_%H-%M-%S").to_string()
}

/// 展示用时间戳 (日志与事件载荷)
pub fn gen_time_display(t: chrono::DateTime<chrono::Local>) -> String {
    t.format("%Y-%m-%d %H:%M:%S").to_string()
}
