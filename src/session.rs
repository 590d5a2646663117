//! 检测会话生命周期
//! Detection session lifecycle
//!
//! 同一时刻最多一个检测工作线程。active标志的检查与设置在同一把
//! 互斥锁内完成, 两个控制入口并发触发也不会出现双worker; stop只发
//! 信号不等待, 循环在下一次迭代顶部观察到标志后退出。

use crate::detection::{detection_thread, DetectionContext, WorkerConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

/// start命令结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyRunning,
}

/// stop命令结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    NotRunning,
}

pub struct SessionController {
    active: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<()>>>,
    ctx: DetectionContext,
    config: WorkerConfig,
}

impl SessionController {
    pub fn new(ctx: DetectionContext) -> Self {
        Self::with_config(ctx, WorkerConfig::default())
    }

    pub fn with_config(ctx: DetectionContext, config: WorkerConfig) -> Self {
        Self {
            active: Arc::new(AtomicBool::new(false)),
            worker: Mutex::new(None),
            ctx,
            config,
        }
    }

    /// 启动检测会话 (幂等)
    ///
    /// 会话状态 (历史窗口/去抖计数) 在工作线程内重新构建, 不从上一个
    /// 会话残留。
    pub fn start(&self) -> StartOutcome {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);

        if self.active.load(Ordering::SeqCst) {
            println!("⚠️ 检测已在运行, 忽略重复启动");
            return StartOutcome::AlreadyRunning;
        }

        // 上一个worker已被stop叫停, 等它退出再启动, 保证永不双worker
        if let Some(handle) = worker.take() {
            let _ = handle.join();
        }

        self.active.store(true, Ordering::SeqCst);

        let active = Arc::clone(&self.active);
        let ctx = self.ctx.clone();
        let config = self.config.clone();
        *worker = Some(std::thread::spawn(move || {
            detection_thread(active, ctx, config);
        }));

        println!("✅ 检测会话已启动");
        StartOutcome::Started
    }

    /// 停止检测会话 (幂等, 只发信号不等待线程退出)
    pub fn stop(&self) -> StopOutcome {
        let _worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);

        if !self.active.load(Ordering::SeqCst) {
            return StopOutcome::NotRunning;
        }

        self.active.store(false, Ordering::SeqCst);
        println!("🛑 检测会话停止信号已发出");
        StopOutcome::Stopped
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// 等待当前worker退出 (关停收尾用)
    pub fn join(&self) {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = worker.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
        let worker = self.worker.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = worker.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::EventBroadcaster;
    use crate::detection::Frame;
    use crate::fall_log::FallLog;
    use crate::input::SyntheticCamera;
    use crate::models::ScriptedPoseEstimator;
    use crate::storage::ScreenshotStore;
    use anyhow::Result;
    use std::time::Duration;

    struct NullStore;

    impl ScreenshotStore for NullStore {
        fn save(&self, _frame: &Frame, label: &str) -> Result<String> {
            Ok(format!("/static/fall_images/fall_{label}.jpg"))
        }
    }

    /// 空脚本模型: 每帧画面无人, 循环只走休眠路径
    fn controller() -> SessionController {
        let ctx = DetectionContext {
            source: Arc::new(Mutex::new(Box::new(SyntheticCamera::new(4, 4)))),
            model: Arc::new(Mutex::new(Box::new(ScriptedPoseEstimator::new(Vec::new())))),
            store: Arc::new(NullStore),
            fall_log: Arc::new(FallLog::new()),
            broadcaster: Arc::new(EventBroadcaster::new()),
        };
        let config = WorkerConfig {
            frame_interval: Duration::from_millis(1),
            error_backoff: Duration::from_millis(1),
        };
        SessionController::with_config(ctx, config)
    }

    #[test]
    fn test_start_is_idempotent() {
        let controller = controller();
        assert!(!controller.is_active());

        assert_eq!(controller.start(), StartOutcome::Started);
        assert!(controller.is_active());
        // 重复start不会再起一个worker
        assert_eq!(controller.start(), StartOutcome::AlreadyRunning);

        assert_eq!(controller.stop(), StopOutcome::Stopped);
        controller.join();
    }

    #[test]
    fn test_stop_while_inactive_is_noop() {
        let controller = controller();
        assert_eq!(controller.stop(), StopOutcome::NotRunning);
        assert_eq!(controller.stop(), StopOutcome::NotRunning);
        assert!(!controller.is_active());
    }

    #[test]
    fn test_restart_after_stop() {
        let controller = controller();

        assert_eq!(controller.start(), StartOutcome::Started);
        assert_eq!(controller.stop(), StopOutcome::Stopped);
        assert!(!controller.is_active());

        // start会先等上一个worker退出再启动新会话
        assert_eq!(controller.start(), StartOutcome::Started);
        assert!(controller.is_active());

        assert_eq!(controller.stop(), StopOutcome::Stopped);
        controller.join();
    }

    #[test]
    fn test_drop_stops_worker() {
        let controller = controller();
        controller.start();
        drop(controller); // join在Drop内完成, 不悬挂线程
    }
}
