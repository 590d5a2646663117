//! 姿态模型接口与具体实现
//! Pose model interface and implementations

pub mod scripted;

pub use scripted::{fallen_pose, standing_pose, ScriptedPoseEstimator};

use crate::detection::{Frame, PoseKeypoints};
use anyhow::Result;

/// 姿态估计模型 (外部协作方)
///
/// 每帧返回零个或多个目标的关键点集合, 集合可以为空 (画面无人)。
pub trait PoseEstimator {
    fn infer(&mut self, frame: &Frame) -> Result<Vec<PoseKeypoints>>;
}
