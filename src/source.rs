//! 模拟的外部数据源

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("upstream fetch failed for {id}: {reason}")]
    Upstream { id: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub data: String,
}

#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch(&self, id: &str) -> Result<Record, FetchError>;
}

/// 固定延迟后返回结果，用来模拟较慢的外部 API
#[derive(Debug, Clone)]
pub struct SimulatedSource {
    latency: Duration,
}

impl SimulatedSource {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl DataSource for SimulatedSource {
    async fn fetch(&self, id: &str) -> Result<Record, FetchError> {
        tracing::debug!("Fetching record {} from simulated source", id);
        tokio::time::sleep(self.latency).await;
        Ok(Record {
            id: id.to_string(),
            data: format!("Data for ID {}", id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn simulated_fetch_waits_for_latency() {
        let source = SimulatedSource::new(Duration::from_secs(2));
        let started = tokio::time::Instant::now();

        let record = source.fetch("42").await.unwrap();

        assert!(started.elapsed() >= Duration::from_secs(2));
        assert_eq!(
            record,
            Record {
                id: "42".into(),
                data: "Data for ID 42".into()
            }
        );
    }
}
