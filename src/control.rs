//! 控制入口
//! Control surfaces for the web layer
//!
//! 请求式触发与Socket式命令是两套独立入口, 但都只经由同一个
//! SessionController状态迁移, 两边对"会话是否在运行"永远一致。

use crate::fall_log::FallLog;
use crate::session::{SessionController, StartOutcome, StopOutcome};
use serde::Serialize;
use serde_json::{json, Value};

// ========== 请求式入口 ==========

/// 控制命令应答 (status/message结构与前端约定一致)
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ControlResponse {
    pub status: String,
    pub message: String,
}

impl ControlResponse {
    fn success(message: &str) -> Self {
        Self {
            status: "success".into(),
            message: message.into(),
        }
    }

    fn error(message: &str) -> Self {
        Self {
            status: "error".into(),
            message: message.into(),
        }
    }
}

/// 请求式启动检测
pub fn start_detection(controller: &SessionController) -> ControlResponse {
    match controller.start() {
        StartOutcome::Started => ControlResponse::success("Detection started"),
        StartOutcome::AlreadyRunning => ControlResponse::error("Detection already running"),
    }
}

/// 请求式停止检测 (未运行时同样应答成功)
pub fn stop_detection(controller: &SessionController) -> ControlResponse {
    match controller.stop() {
        StopOutcome::Stopped | StopOutcome::NotRunning => {
            ControlResponse::success("Detection stopped")
        }
    }
}

/// 请求式读取跌倒日志 (按告警顺序的JSON数组)
pub fn fall_logs(log: &FallLog) -> Value {
    serde_json::to_value(log.snapshot()).unwrap_or_else(|_| json!([]))
}

// ========== Socket式入口 ==========

/// Socket命令
#[derive(Debug, Clone)]
pub enum SocketCommand {
    Connect,
    Disconnect,
    StartDetection,
    StopDetection,
    EmergencyAlert(Value),
}

/// Socket应答: 回给发起方的事件名与载荷
#[derive(Debug, Clone, PartialEq)]
pub struct SocketAck {
    pub event: &'static str,
    pub payload: Value,
}

fn status_ack(message: &str) -> SocketAck {
    SocketAck {
        event: "status",
        payload: json!({ "message": message }),
    }
}

/// 处理一条Socket命令; 无需应答时返回None
pub fn handle_socket_command(
    controller: &SessionController,
    command: SocketCommand,
) -> Option<SocketAck> {
    match command {
        SocketCommand::Connect => {
            println!("🔌 客户端已连接");
            Some(status_ack("Connected to fall detection service"))
        }
        SocketCommand::Disconnect => {
            println!("🔌 客户端已断开");
            None
        }
        SocketCommand::StartDetection => {
            println!("▶️ 收到启动检测命令");
            match controller.start() {
                StartOutcome::Started => Some(status_ack("Detection started successfully")),
                StartOutcome::AlreadyRunning => Some(status_ack("Detection already running")),
            }
        }
        SocketCommand::StopDetection => {
            println!("⏹️ 收到停止检测命令");
            controller.stop();
            Some(status_ack("Detection stopped"))
        }
        SocketCommand::EmergencyAlert(data) => {
            println!("🆘 收到紧急求助: {data}");
            Some(SocketAck {
                event: "emergency_confirmed",
                payload: json!({ "status": "alert_sent" }),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::EventBroadcaster;
    use crate::detection::{DetectionContext, Frame, WorkerConfig};
    use crate::fall_log::FallLog;
    use crate::input::SyntheticCamera;
    use crate::models::ScriptedPoseEstimator;
    use crate::storage::ScreenshotStore;
    use anyhow::Result;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    struct NullStore;

    impl ScreenshotStore for NullStore {
        fn save(&self, _frame: &Frame, label: &str) -> Result<String> {
            Ok(format!("/static/fall_images/fall_{label}.jpg"))
        }
    }

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
    fn test_request_surface_responses() {
        let controller = controller();

        let resp = start_detection(&controller);
        assert_eq!(resp.status, "success");
        assert_eq!(resp.message, "Detection started");

        let resp = start_detection(&controller);
        assert_eq!(resp.status, "error");
        assert_eq!(resp.message, "Detection already running");

        let resp = stop_detection(&controller);
        assert_eq!(resp.status, "success");
        assert_eq!(resp.message, "Detection stopped");

        // 未运行时stop同样应答成功
        let resp = stop_detection(&controller);
        assert_eq!(resp.status, "success");
        controller.join();
    }

    #[test]
    fn test_both_surfaces_share_one_transition() {
        let controller = controller();

        // 请求式启动后, Socket式启动看到的是同一个会话
        assert_eq!(start_detection(&controller).status, "success");
        let ack = handle_socket_command(&controller, SocketCommand::StartDetection).unwrap();
        assert_eq!(ack.event, "status");
        assert_eq!(ack.payload["message"], "Detection already running");

        // Socket式停止后, 请求式视角同样是未运行
        let ack = handle_socket_command(&controller, SocketCommand::StopDetection).unwrap();
        assert_eq!(ack.payload["message"], "Detection stopped");
        assert!(!controller.is_active());
        assert_eq!(stop_detection(&controller).status, "success");
        controller.join();
    }

    #[test]
    fn test_connection_lifecycle_acks() {
        let controller = controller();

        let ack = handle_socket_command(&controller, SocketCommand::Connect).unwrap();
        assert_eq!(ack.event, "status");
        assert_eq!(ack.payload["message"], "Connected to fall detection service");

        // 断开只记录, 不应答
        assert!(handle_socket_command(&controller, SocketCommand::Disconnect).is_none());
        // 连接事件不影响会话状态
        assert!(!controller.is_active());
    }

    #[test]
    fn test_fall_logs_read_surface() {
        let log = FallLog::new();
        assert_eq!(fall_logs(&log), serde_json::json!([]));

        log.append(crate::fall_log::FallLogEntry {
            timestamp: "2025-07-08 17:38:05".into(),
            image: "/static/fall_images/fall_2025-07-08_17-38-05.jpg".into(),
        });
        let value = fall_logs(&log);
        assert_eq!(value[0]["timestamp"], "2025-07-08 17:38:05");
        assert_eq!(
            value[0]["image"],
            "/static/fall_images/fall_2025-07-08_17-38-05.jpg"
        );
    }

    #[test]
    fn test_emergency_alert_ack() {
        let controller = controller();
        let ack = handle_socket_command(
            &controller,
            SocketCommand::EmergencyAlert(serde_json::json!({ "from": "bedroom" })),
        )
        .unwrap();
        assert_eq!(ack.event, "emergency_confirmed");
        assert_eq!(ack.payload["status"], "alert_sent");
    }
}
