//! 通知订阅端
//!
//! 订阅只在启动时建立一次。消息流在连接断开后结束，不会重连，
//! 断开期间发布的消息会永久丢失。

use futures_util::{Stream, StreamExt};

use crate::store::{Notification, NotificationStream, Store, StoreError};

pub async fn subscribe(store: &dyn Store, channel: &str) -> Result<NotificationStream, StoreError> {
    let events = store.subscribe(channel).await?;
    tracing::info!("Subscribed to {}. Waiting for messages...", channel);
    Ok(events)
}

pub fn received_line(notification: &Notification) -> String {
    format!(
        "Received message on channel \"{}\": {}",
        notification.channel, notification.payload
    )
}

/// 逐条记录消息直到流结束，返回处理的消息数
pub async fn log_notifications<S>(mut events: S) -> u64
where
    S: Stream<Item = Notification> + Unpin,
{
    let mut received = 0;
    while let Some(notification) = events.next().await {
        tracing::info!("{}", received_line(&notification));
        received += 1;
    }
    received
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use std::time::Duration;

    use crate::store::MemoryStore;

    fn notification(payload: &str) -> Notification {
        Notification {
            channel: "notifications".into(),
            payload: payload.into(),
        }
    }

    #[test]
    fn formats_received_line() {
        assert_eq!(
            received_line(&notification("hello")),
            "Received message on channel \"notifications\": hello"
        );
    }

    #[tokio::test]
    async fn consumes_until_stream_ends() {
        let events = stream::iter(vec![notification("a"), notification("b")]);
        assert_eq!(log_notifications(events).await, 2);
    }

    #[tokio::test]
    async fn receives_published_messages() {
        let store = MemoryStore::new();
        let mut events = subscribe(&store, "notifications").await.unwrap();

        store.publish("notifications", "hello").await.unwrap();
        store.publish("other", "ignored").await.unwrap();
        store.publish("notifications", "again").await.unwrap();

        let first = tokio::time::timeout(Duration::from_secs(1), events.next()).await.unwrap();
        let second = tokio::time::timeout(Duration::from_secs(1), events.next()).await.unwrap();
        assert_eq!(first, Some(notification("hello")));
        assert_eq!(second, Some(notification("again")));
    }

    #[tokio::test]
    async fn subscription_failure_is_returned() {
        let store = MemoryStore::new();
        store.set_available(false);
        assert!(subscribe(&store, "notifications").await.is_err());
    }
}
