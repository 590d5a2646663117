//! 单帧跌倒判定
//! Per-frame fall classification from pose keypoints

use super::types::PoseKeypoints;
use crate::{KP_LEFT_HIP, KP_LEFT_SHOULDER, KP_NOSE, KP_RIGHT_HIP, KP_RIGHT_SHOULDER};

// ========== 配置 ==========

/// 跌倒判定阈值配置
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// 横纵跨度比阈值, 大于该值视为身体放平
    pub flat_ratio: f32,
    /// 鼻点纵向突变阈值 (像素)
    pub drop_threshold: f32,
    /// 跨度比分母的最小量, 防止除零
    pub epsilon: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            flat_ratio: 1.5,
            drop_threshold: 50.0,
            epsilon: 1e-5,
        }
    }
}

// ========== 姿态几何量 ==========

/// 单帧姿态几何量
#[derive(Debug, Clone, Copy)]
pub struct PostureMetrics {
    pub nose: (f32, f32),
    pub hip_center: (f32, f32),
    /// 肩部中点, 暂不参与判定, 作为可用信号保留
    pub shoulder_center: (f32, f32),
    pub vertical_span: f32,
    pub horizontal_span: f32,
    pub posture_ratio: f32,
}

// ========== 判定器 ==========

/// 跌倒判定器
///
/// 同时满足两个条件才判定跌倒: 身体放平 (鼻点相对髋部中点横向跨度
/// 明显大于纵向) 且参照帧存在时鼻点发生纵向突变。缓慢躺下或静止的
/// 平躺姿态 (如拉伸) 不触发。
pub struct FallClassifier {
    config: ClassifierConfig,
}

impl FallClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// 单帧跌倒判定
    ///
    /// 调用方保证关键点数量达到下限; 输入异常 (关键点缺失/坐标非有限值)
    /// 一律返回false, 不中断检测循环。
    pub fn classify(&self, keypoints: &PoseKeypoints, prior: Option<&PoseKeypoints>) -> bool {
        let metrics = match self.metrics(keypoints) {
            Some(m) => m,
            None => return false,
        };

        let is_flat = metrics.posture_ratio > self.config.flat_ratio;

        // 姿态突变: 仅当参照帧存在时才可能成立
        let sudden_drop = match prior.and_then(|p| p.point(KP_NOSE)) {
            Some((_, prior_y)) => (metrics.nose.1 - prior_y).abs() > self.config.drop_threshold,
            None => false,
        };

        is_flat && sudden_drop
    }

    /// 计算姿态几何量; 关键点缺失或坐标异常时返回None
    pub fn metrics(&self, keypoints: &PoseKeypoints) -> Option<PostureMetrics> {
        let nose = keypoints.point(KP_NOSE)?;
        let left_hip = keypoints.point(KP_LEFT_HIP)?;
        let right_hip = keypoints.point(KP_RIGHT_HIP)?;
        let left_shoulder = keypoints.point(KP_LEFT_SHOULDER)?;
        let right_shoulder = keypoints.point(KP_RIGHT_SHOULDER)?;

        let hip_center = midpoint(left_hip, right_hip);
        let shoulder_center = midpoint(left_shoulder, right_shoulder);

        let vertical_span = (nose.1 - hip_center.1).abs();
        let horizontal_span = (nose.0 - hip_center.0).abs();
        let posture_ratio = horizontal_span / (vertical_span + self.config.epsilon);

        if !posture_ratio.is_finite() {
            return None;
        }

        Some(PostureMetrics {
            nose,
            hip_center,
            shoulder_center,
            vertical_span,
            horizontal_span,
            posture_ratio,
        })
    }
}

impl Default for FallClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

fn midpoint(a: (f32, f32), b: (f32, f32)) -> (f32, f32) {
    ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0)
}
