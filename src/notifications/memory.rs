//! Last emitted signal state, and where it survives restarts.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::EngineError;
use crate::models::SignalState;

/// State owned by the notifier. Only the notifier mutates it, and only right
/// after an emission decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NotificationMemory {
    pub last_emitted_state: SignalState,
}

#[async_trait]
pub trait MemoryStore: Send + Sync {
    async fn load(&self) -> Result<Option<NotificationMemory>, EngineError>;
    async fn save(&self, memory: &NotificationMemory) -> Result<(), EngineError>;
}

/// Redis-backed store, one key per deployment or session.
pub struct RedisMemoryStore {
    connection: ConnectionManager,
    key: String,
}

impl RedisMemoryStore {
    pub async fn connect(redis_url: &str, key: impl Into<String>) -> Result<Self, EngineError> {
        let client =
            redis::Client::open(redis_url).map_err(|e| EngineError::MemoryStore(e.to_string()))?;
        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| EngineError::MemoryStore(e.to_string()))?;
        let key = key.into();
        info!(key = %key, "RedisMemoryStore: connected");
        Ok(Self { connection, key })
    }
}

#[async_trait]
impl MemoryStore for RedisMemoryStore {
    async fn load(&self) -> Result<Option<NotificationMemory>, EngineError> {
        let mut connection = self.connection.clone();
        let raw: Option<String> = connection
            .get(&self.key)
            .await
            .map_err(|e| EngineError::MemoryStore(e.to_string()))?;

        raw.map(|json| {
            serde_json::from_str(&json).map_err(|e| EngineError::MemoryStore(e.to_string()))
        })
        .transpose()
    }

    async fn save(&self, memory: &NotificationMemory) -> Result<(), EngineError> {
        let json =
            serde_json::to_string(memory).map_err(|e| EngineError::MemoryStore(e.to_string()))?;
        let mut connection = self.connection.clone();
        connection
            .set::<_, _, ()>(&self.key, json)
            .await
            .map_err(|e| EngineError::MemoryStore(e.to_string()))
    }
}
