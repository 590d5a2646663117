//! 跌倒日志
//! Append-only record of fall alerts

use serde::Serialize;
use std::sync::{Mutex, PoisonError};

/// 单条跌倒记录 (字段名与日志查询接口的JSON约定一致)
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct FallLogEntry {
    pub timestamp: String,
    pub image: String,
}

/// 进程级跌倒日志
///
/// 每次告警追加一条 (不是每帧一条), 进程存续期间只增不减, 对外只读。
/// 由进程持有, 跨越单个检测会话的生命周期。
pub struct FallLog {
    entries: Mutex<Vec<FallLogEntry>>,
}

impl FallLog {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn append(&self, entry: FallLogEntry) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    /// 当前日志快照 (按追加顺序)
    pub fn snapshot(&self) -> Vec<FallLogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for FallLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let log = FallLog::new();
        assert!(log.is_empty());

        for i in 0..3 {
            log.append(FallLogEntry {
                timestamp: format!("2025-07-08 17:38:0{i}"),
                image: format!("/static/fall_images/fall_{i}.jpg"),
            });
        }

        let snapshot = log.snapshot();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot[0].timestamp, "2025-07-08 17:38:00");
        assert_eq!(snapshot[2].image, "/static/fall_images/fall_2.jpg");
    }

    #[test]
    fn test_snapshot_is_detached() {
        let log = FallLog::new();
        log.append(FallLogEntry {
            timestamp: "2025-07-08 17:38:05".into(),
            image: "/static/fall_images/fall_0.jpg".into(),
        });

        let snapshot = log.snapshot();
        log.append(FallLogEntry {
            timestamp: "2025-07-08 17:38:06".into(),
            image: "/static/fall_images/fall_1.jpg".into(),
        });

        assert_eq!(snapshot.len(), 1);
        assert_eq!(log.len(), 2);
    }
}
