//! 跌倒判定的时域去抖
//! Temporal debouncing of per-frame fall verdicts

use chrono::{DateTime, Local};

// ========== 置信度参数 ==========

/// 基础置信度
const BASE_CONFIDENCE: f32 = 0.85;
/// 每累计一帧连续跌倒的提升量
const CONFIDENCE_STEP: f32 = 0.05;
/// 置信度上限
const CONFIDENCE_CAP: f32 = 0.95;

/// 单帧去抖结论
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebounceDecision {
    /// 本帧是否应发出告警 (每段连续跌倒最多一次)
    pub should_alert: bool,
    /// 告警置信度, 仅在should_alert时有意义
    pub confidence: f32,
    /// 当前连续跌倒帧计数
    pub consecutive_falls: u32,
}

/// 会话级去抖状态机
///
/// 两个状态: 空闲 (计数0, 告警门打开) 与跌倒段 (计数≥1)。一段未被
/// 非跌倒帧打断的连续跌倒最多触发一次告警; 告警门只在出现非跌倒帧
/// 时重新打开。
///
/// 状态按会话而非按人划分: 已告警期间第二个人跌倒不会再次触发,
/// 这是沿用的既有限制。
pub struct FallDebouncer {
    consecutive_falls: u32,
    has_notified: bool,
    last_fall_time: Option<DateTime<Local>>,
}

impl FallDebouncer {
    pub fn new() -> Self {
        Self {
            consecutive_falls: 0,
            has_notified: false,
            last_fall_time: None,
        }
    }

    /// 送入一帧判定结果
    pub fn update(&mut self, person_is_fallen: bool) -> DebounceDecision {
        if person_is_fallen {
            self.consecutive_falls += 1;

            if !self.has_notified {
                self.has_notified = true;
                self.last_fall_time = Some(Local::now());
                let confidence = (BASE_CONFIDENCE
                    + CONFIDENCE_STEP * self.consecutive_falls as f32)
                    .min(CONFIDENCE_CAP);
                return DebounceDecision {
                    should_alert: true,
                    confidence,
                    consecutive_falls: self.consecutive_falls,
                };
            }

            // 已告警, 只推进计数
            DebounceDecision {
                should_alert: false,
                confidence: 0.0,
                consecutive_falls: self.consecutive_falls,
            }
        } else {
            // 跌倒段结束, 重新打开告警门
            self.consecutive_falls = 0;
            self.has_notified = false;
            DebounceDecision {
                should_alert: false,
                confidence: 0.0,
                consecutive_falls: 0,
            }
        }
    }

    pub fn consecutive_falls(&self) -> u32 {
        self.consecutive_falls
    }

    pub fn has_notified(&self) -> bool {
        self.has_notified
    }

    /// 最近一次告警时间 (保留给冷却策略)
    pub fn last_fall_time(&self) -> Option<DateTime<Local>> {
        self.last_fall_time
    }
}

impl Default for FallDebouncer {
    fn default() -> Self {
        Self::new()
    }
}
