//! 跌倒检测系统
//! Fall detection system
pub mod classifier;
pub mod debouncer;
pub mod history;
pub mod types;
pub mod worker;

pub use classifier::{ClassifierConfig, FallClassifier, PostureMetrics};
pub use debouncer::{DebounceDecision, FallDebouncer};
pub use history::{PoseHistory, HISTORY_CAPACITY};
pub use types::{FallEvent, Frame, PoseKeypoints};
pub use worker::{detection_thread, DetectionContext, WorkerConfig};
