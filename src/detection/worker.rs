//! 检测工作线程
//! The per-frame detection loop
//!
//! 每次迭代: 取帧 → 姿态推理 → 逐人判定 → 去抖 → 告警 → 固定休眠。
//! 单次迭代内的任何错误都被捕获并退避重试, 循环只在会话标志变为
//! false时退出。

use super::classifier::FallClassifier;
use super::debouncer::FallDebouncer;
use super::history::PoseHistory;
use super::types::{FallEvent, Frame};
use crate::broadcast::EventBroadcaster;
use crate::fall_log::{FallLog, FallLogEntry};
use crate::input::FrameSource;
use crate::models::PoseEstimator;
use crate::storage::ScreenshotStore;
use crate::{gen_time_display, gen_time_label, MIN_KEYPOINTS};
use anyhow::Result;
use chrono::Local;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

// ========== 循环节奏 ==========

/// 工作线程节奏配置
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// 每帧处理后的固定休眠, 限制CPU占用与帧处理速率
    pub frame_interval: Duration,
    /// 单次迭代出错后的退避休眠
    pub error_backoff: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(100),
            error_backoff: Duration::from_secs(1),
        }
    }
}

/// 检测循环的协作方集合 (随会话克隆进工作线程)
#[derive(Clone)]
pub struct DetectionContext {
    pub source: Arc<Mutex<Box<dyn FrameSource + Send>>>,
    pub model: Arc<Mutex<Box<dyn PoseEstimator + Send>>>,
    pub store: Arc<dyn ScreenshotStore>,
    pub fall_log: Arc<FallLog>,
    pub broadcaster: Arc<EventBroadcaster>,
}

/// 会话私有状态: 每次start重新构建, 不跨会话残留
struct SessionState {
    classifier: FallClassifier,
    history: PoseHistory,
    debouncer: FallDebouncer,
}

impl SessionState {
    fn new() -> Self {
        Self {
            classifier: FallClassifier::default(),
            history: PoseHistory::new(),
            debouncer: FallDebouncer::new(),
        }
    }
}

enum IterationOutcome {
    /// 处理了一帧, 按固定间隔休眠
    Processed,
    /// 取不到帧, 直接进入下一次迭代
    NoFrame,
}

/// 检测工作线程入口: 循环直到会话标志变为false
pub fn detection_thread(active: Arc<AtomicBool>, ctx: DetectionContext, config: WorkerConfig) {
    println!("✅ 检测线程启动 (Detection thread started)");

    let mut state = SessionState::new();

    while active.load(Ordering::SeqCst) {
        match run_iteration(&ctx, &mut state) {
            Ok(IterationOutcome::Processed) => std::thread::sleep(config.frame_interval),
            Ok(IterationOutcome::NoFrame) => {}
            Err(e) => {
                eprintln!("❌ 检测迭代异常: {e:?}");
                std::thread::sleep(config.error_backoff);
            }
        }
    }

    println!("✅ 检测线程退出 (Detection thread exited)");
}

/// 单次迭代
fn run_iteration(ctx: &DetectionContext, state: &mut SessionState) -> Result<IterationOutcome> {
    let frame = {
        let mut source = ctx.source.lock().unwrap_or_else(PoisonError::into_inner);
        source.next_frame()
    };
    let frame = match frame {
        Some(f) => f,
        None => return Ok(IterationOutcome::NoFrame),
    };

    let persons = {
        let mut model = ctx.model.lock().unwrap_or_else(PoisonError::into_inner);
        model.infer(&frame)?
    };

    if persons.is_empty() {
        return Ok(IterationOutcome::Processed);
    }

    let mut any_classified = false;
    let mut fallen_detected = false;

    for keypoints in &persons {
        // 关键点不足的目标直接跳过, 不参与判定
        if keypoints.len() < MIN_KEYPOINTS {
            continue;
        }
        any_classified = true;

        state.history.push(keypoints.clone());
        let fallen = {
            let prior = state.history.prior();
            state.classifier.classify(keypoints, prior)
        };

        if fallen {
            fallen_detected = true;
            let decision = state.debouncer.update(true);

            if decision.should_alert {
                handle_alert(ctx, &frame, decision.confidence, decision.consecutive_falls)?;
            } else {
                println!(
                    "⏳ 持续跌倒中 (consecutive: {}), 不重复通知",
                    decision.consecutive_falls
                );
            }
        }
    }

    // 有可判定目标但无人跌倒 → 跌倒段结束, 重置计数并重新打开告警门
    if any_classified && !fallen_detected {
        let before = state.debouncer.consecutive_falls();
        state.debouncer.update(false);
        if before > 0 {
            println!("🔄 跌倒结束, 连续计数从 {} 重置", before);
        }
    }

    Ok(IterationOutcome::Processed)
}

/// 告警处理: 截图 → 记日志 → 广播
fn handle_alert(
    ctx: &DetectionContext,
    frame: &Frame,
    confidence: f32,
    consecutive_falls: u32,
) -> Result<()> {
    let now = Local::now();
    let label = gen_time_label(now);

    let image_path = ctx.store.save(frame, &label)?;

    ctx.fall_log.append(FallLogEntry {
        timestamp: gen_time_display(now),
        image: image_path.clone(),
    });

    println!(
        "🚨 检测到跌倒, 已通知 (consecutive: {}, confidence: {:.2})",
        consecutive_falls, confidence
    );
    let event = FallEvent::new(now, image_path, confidence, consecutive_falls);
    ctx.broadcaster.publish(&event);

    Ok(())
}
