/// 跌倒卫兵 (Fall Sentinel)
///
/// 跌倒检测演示程序
///
/// 系统架构:
/// 1. 检测线程: 取帧 → 姿态推理 → 跌倒判定 → 去抖告警 (独立工作线程)
/// 2. 订阅线程: 接收fall_detection事件 (模拟已连接的前端)
/// 3. 主线程:   会话控制与运行时长管理
use clap::Parser;
use fall_sentinel::broadcast::{EventBroadcaster, FALL_CHANNEL};
use fall_sentinel::control::{self, SocketCommand};
use fall_sentinel::detection::{DetectionContext, PoseKeypoints};
use fall_sentinel::fall_log::FallLog;
use fall_sentinel::input::SyntheticCamera;
use fall_sentinel::models::{fallen_pose, standing_pose, ScriptedPoseEstimator};
use fall_sentinel::session::SessionController;
use fall_sentinel::storage::DiskScreenshotStore;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 跌倒卫兵参数
#[derive(Parser, Debug)]
#[command(author, version, about = "跌倒卫兵 - 跌倒检测演示", long_about = None)]
struct Args {
    /// 运行时长 (秒)
    #[arg(short, long, default_value_t = 10)]
    duration: u64,

    /// 截图保存目录
    #[arg(long, default_value = "static/fall_images")]
    save_dir: PathBuf,

    /// 合成关键点坐标噪声幅度 (像素)
    #[arg(long, default_value_t = 2.0)]
    jitter: f32,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    println!("🚀 跌倒卫兵系统启动");
    println!("📁 截图目录: {}", args.save_dir.display());
    println!("⏱️ 运行时长: {}秒", args.duration);
    println!();

    // ========== 组装协作方 ==========
    // 合成摄像头 + 脚本化姿态序列: 站立若干帧后突然倒地, 再起身, 循环
    let mut script: Vec<Vec<PoseKeypoints>> = Vec::new();
    script.extend(std::iter::repeat_with(|| vec![standing_pose(320.0, 160.0)]).take(30));
    script.extend(std::iter::repeat_with(|| vec![fallen_pose(320.0, 300.0)]).take(8));
    script.extend(std::iter::repeat_with(|| vec![standing_pose(320.0, 160.0)]).take(10));

    let camera = SyntheticCamera::new(640, 480);
    let model = ScriptedPoseEstimator::new(script)
        .looping()
        .with_jitter(args.jitter);
    let store = DiskScreenshotStore::with_dir(args.save_dir.clone(), "/static/fall_images")?;
    let fall_log = Arc::new(FallLog::new());
    let broadcaster = Arc::new(EventBroadcaster::new());

    let ctx = DetectionContext {
        source: Arc::new(Mutex::new(Box::new(camera))),
        model: Arc::new(Mutex::new(Box::new(model))),
        store: Arc::new(store),
        fall_log: Arc::clone(&fall_log),
        broadcaster: Arc::clone(&broadcaster),
    };

    let controller = SessionController::new(ctx);

    // ========== 订阅线程: 模拟已连接的前端 ==========
    let rx = broadcaster.subscribe();
    let subscriber = std::thread::spawn(move || {
        while let Ok(event) = rx.recv() {
            println!(
                "📬 [{}] 收到告警: fall_id={} confidence={:.2} image={}",
                FALL_CHANNEL, event.fall_id, event.confidence, event.image_path
            );
        }
    });

    // ========== 会话控制: 两套入口等价 ==========
    if let Some(ack) = control::handle_socket_command(&controller, SocketCommand::Connect) {
        println!("📨 [{}] {}", ack.event, ack.payload);
    }

    let resp = control::start_detection(&controller);
    println!("📨 [start_detection] {}: {}", resp.status, resp.message);

    std::thread::sleep(Duration::from_secs(args.duration));

    let resp = control::stop_detection(&controller);
    println!("📨 [stop_detection] {}: {}", resp.status, resp.message);
    controller.join();

    // ========== 收尾: 打印跌倒日志 ==========
    println!();
    println!("📊 跌倒日志共 {} 条:", fall_log.len());
    for entry in fall_log.snapshot() {
        println!("   {} -> {}", entry.timestamp, entry.image);
    }
    println!("📉 慢订阅者丢弃事件数: {}", broadcaster.dropped_count());

    // 广播器随会话上下文一起释放后, 订阅通道关闭, 订阅线程退出
    drop(controller);
    drop(broadcaster);
    let _ = subscriber.join();

    Ok(())
}
