//! 跌倒事件广播
//! Fan-out of fall events to connected subscribers
//!
//! 推送为尽力而为: 不确认、不重试、不为晚到的订阅者补发。每个订阅者
//! 持有一条有界通道, 投递用try_send, 慢订阅者只会丢事件, 不会拖慢
//! 检测循环; 丢弃数量计入计数器。

use crate::detection::FallEvent;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// 跌倒事件推送通道名
pub const FALL_CHANNEL: &str = "fall_detection";

/// 每个订阅者的通道容量
const SUBSCRIBER_BUFFER: usize = 60;

pub struct EventBroadcaster {
    subscribers: Mutex<Vec<Sender<FallEvent>>>,
    dropped: AtomicU64,
}

impl EventBroadcaster {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            dropped: AtomicU64::new(0),
        }
    }

    /// 订阅跌倒事件推送
    pub fn subscribe(&self) -> Receiver<FallEvent> {
        let (tx, rx) = bounded(SUBSCRIBER_BUFFER);
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// 广播一条跌倒事件, 同时打印投递轨迹
    pub fn publish(&self, event: &FallEvent) {
        let mut delivered = 0usize;
        {
            let mut subscribers = self
                .subscribers
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            subscribers.retain(|tx| match tx.try_send(event.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(TrySendError::Full(_)) => {
                    // 订阅者积压, 丢弃本条
                    self.dropped.fetch_add(1, Ordering::Relaxed);
                    true
                }
                Err(TrySendError::Disconnected(_)) => false,
            });
        }

        match serde_json::to_string(event) {
            Ok(payload) => println!(
                "📢 [{}] 已投递 {} 个订阅者: {}",
                FALL_CHANNEL, delivered, payload
            ),
            Err(e) => eprintln!("❌ 事件序列化失败: {e}"),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// 因订阅者积压而丢弃的事件数
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    fn event(id: u32) -> FallEvent {
        FallEvent::new(Local::now(), format!("/static/fall_images/{id}.jpg"), 0.9, 1)
    }

    #[test]
    fn test_fanout_to_all_subscribers() {
        let broadcaster = EventBroadcaster::new();
        let rx1 = broadcaster.subscribe();
        let rx2 = broadcaster.subscribe();
        assert_eq!(broadcaster.subscriber_count(), 2);

        broadcaster.publish(&event(1));

        assert_eq!(rx1.try_iter().count(), 1);
        assert_eq!(rx2.try_iter().count(), 1);
        assert_eq!(broadcaster.dropped_count(), 0);
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let broadcaster = EventBroadcaster::new();
        broadcaster.publish(&event(1));
        assert_eq!(broadcaster.dropped_count(), 0);
    }

    #[test]
    fn test_slow_subscriber_drops_without_blocking() {
        let broadcaster = EventBroadcaster::new();
        let rx = broadcaster.subscribe();

        // 填满订阅通道后继续发布, publish不阻塞, 超出部分被丢弃
        for i in 0..(SUBSCRIBER_BUFFER as u32 + 3) {
            broadcaster.publish(&event(i));
        }

        assert_eq!(broadcaster.dropped_count(), 3);
        assert_eq!(rx.try_iter().count(), SUBSCRIBER_BUFFER);
    }

    #[test]
    fn test_disconnected_subscriber_is_pruned() {
        let broadcaster = EventBroadcaster::new();
        let rx = broadcaster.subscribe();
        drop(rx);

        broadcaster.publish(&event(1));
        assert_eq!(broadcaster.subscriber_count(), 0);
    }
}
