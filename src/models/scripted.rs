//! 脚本化姿态序列
//! Scripted keypoint sequences for demos and tests

use super::PoseEstimator;
use crate::detection::{Frame, PoseKeypoints};
use crate::{KP_LEFT_HIP, KP_LEFT_SHOULDER, KP_NOSE, KP_RIGHT_HIP, KP_RIGHT_SHOULDER};
use anyhow::Result;
use rand::Rng;

/// 按预定脚本逐帧回放关键点的"模型"
///
/// 每帧一个条目 (每条目零或多人), 播完后返回空结果, 或循环回放。
/// 可选对坐标加均匀噪声, 模拟真实模型的抖动。
pub struct ScriptedPoseEstimator {
    script: Vec<Vec<PoseKeypoints>>,
    cursor: usize,
    loop_script: bool,
    jitter: f32,
}

impl ScriptedPoseEstimator {
    pub fn new(script: Vec<Vec<PoseKeypoints>>) -> Self {
        Self {
            script,
            cursor: 0,
            loop_script: false,
            jitter: 0.0,
        }
    }

    /// 播完后从头循环
    pub fn looping(mut self) -> Self {
        self.loop_script = true;
        self
    }

    /// 坐标噪声幅度 (像素)
    pub fn with_jitter(mut self, jitter: f32) -> Self {
        self.jitter = jitter;
        self
    }
}

impl PoseEstimator for ScriptedPoseEstimator {
    fn infer(&mut self, _frame: &Frame) -> Result<Vec<PoseKeypoints>> {
        if self.cursor >= self.script.len() {
            if self.loop_script && !self.script.is_empty() {
                self.cursor = 0;
            } else {
                return Ok(Vec::new());
            }
        }

        let mut persons = self.script[self.cursor].clone();
        self.cursor += 1;

        if self.jitter > 0.0 {
            let mut rng = rand::thread_rng();
            for person in &mut persons {
                for (x, y, _) in &mut person.points {
                    *x += rng.gen_range(-self.jitter..=self.jitter);
                    *y += rng.gen_range(-self.jitter..=self.jitter);
                }
            }
        }

        Ok(persons)
    }
}

// ========== 姿态模板 ==========

/// 站立姿态模板: 鼻点在髋部中点正上方100像素
pub fn standing_pose(nose_x: f32, nose_y: f32) -> PoseKeypoints {
    pose_template((nose_x, nose_y), (nose_x, nose_y + 100.0))
}

/// 倒地姿态模板: 鼻点相对髋部中点大幅横向展开
pub fn fallen_pose(nose_x: f32, nose_y: f32) -> PoseKeypoints {
    pose_template((nose_x, nose_y), (nose_x - 100.0, nose_y + 5.0))
}

/// 构造COCO-17布局; 只有判定用到的关节有几何意义, 其余点填充在
/// 髋部附近保证数量达到可判定下限
fn pose_template(nose: (f32, f32), hip_center: (f32, f32)) -> PoseKeypoints {
    let mut points = vec![(hip_center.0, hip_center.1, 0.5); 17];
    points[KP_NOSE] = (nose.0, nose.1, 0.9);
    let sx = (nose.0 + hip_center.0) / 2.0;
    let sy = (nose.1 + hip_center.1) / 2.0;
    points[KP_LEFT_SHOULDER] = (sx - 10.0, sy, 0.9);
    points[KP_RIGHT_SHOULDER] = (sx + 10.0, sy, 0.9);
    points[KP_LEFT_HIP] = (hip_center.0 - 5.0, hip_center.1, 0.9);
    points[KP_RIGHT_HIP] = (hip_center.0 + 5.0, hip_center.1, 0.9);
    PoseKeypoints { points }
}
