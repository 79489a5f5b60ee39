use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::store::Store;

#[derive(Debug, Deserialize)]
pub struct NotifyRequest {
    pub channel: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct NotifyResponse {
    pub success: bool,
    pub message: String,
}

impl NotifyRequest {
    /// 发布到频道，订阅者数量不影响结果
    pub async fn publish(&self, store: &dyn Store) -> Result<NotifyResponse, AppError> {
        let receivers = store.publish(&self.channel, &self.message).await?;
        tracing::debug!(
            "Published to {} ({} subscribers notified)",
            self.channel,
            receivers
        );

        Ok(NotifyResponse {
            success: true,
            message: format!("Message sent to channel: {}", self.channel),
        })
    }
}
