//! 姿态历史窗口
//! Bounded sliding window of recent pose keypoints

use super::types::PoseKeypoints;
use std::collections::VecDeque;

/// 历史窗口容量 (帧)
pub const HISTORY_CAPACITY: usize = 5;

/// 最近关键点的有界滑动窗口, FIFO淘汰
///
/// 窗口按"最后见到"记录, 不跨帧绑定身份; 只用于检测鼻点在短时间内的
/// 纵向突变。参照帧要等窗口填满才可用, 避免开机头几帧误判。
pub struct PoseHistory {
    frames: VecDeque<PoseKeypoints>,
    capacity: usize,
}

impl PoseHistory {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frames: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// 追加一帧关键点, 超出容量时淘汰最旧一帧
    pub fn push(&mut self, keypoints: PoseKeypoints) {
        if self.frames.len() == self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(keypoints);
    }

    /// 参照帧: 窗口填满后返回最旧一帧, 未满时无参照
    pub fn prior(&self) -> Option<&PoseKeypoints> {
        if self.is_full() {
            self.frames.front()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.frames.len() == self.capacity
    }
}

impl Default for PoseHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kp(y: f32) -> PoseKeypoints {
        PoseKeypoints {
            points: vec![(0.0, y, 0.9)],
        }
    }

    #[test]
    fn test_prior_requires_full_window() {
        let mut history = PoseHistory::new();
        for i in 0..4 {
            history.push(kp(i as f32));
            assert!(history.prior().is_none());
        }
        history.push(kp(4.0));
        assert!(history.is_full());
        // 参照帧是窗口内最旧一帧
        assert_eq!(history.prior().unwrap().points[0].1, 0.0);
    }

    #[test]
    fn test_fifo_eviction() {
        let mut history = PoseHistory::new();
        for i in 0..8 {
            history.push(kp(i as f32));
        }
        assert_eq!(history.len(), HISTORY_CAPACITY);
        // 0..2已被淘汰, 最旧一帧是3
        assert_eq!(history.prior().unwrap().points[0].1, 3.0);
    }
}
