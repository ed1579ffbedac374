//! Redis-backed login sessions and per-session data

use async_trait::async_trait;
use redis::{AsyncCommands, Client};

use crate::error::{AppError, AppResult};

/// Server-side session storage
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Open a session for `user_id`
    async fn create(&self, sid: &str, user_id: i32) -> AppResult<()>;
    /// User owning a live session, if any
    async fn user_id(&self, sid: &str) -> AppResult<Option<i32>>;
    /// Increment the session's visit counter and return the new value
    async fn incr_visits(&self, sid: &str) -> AppResult<i64>;
    /// Drop the session and everything stored under it
    async fn destroy(&self, sid: &str) -> AppResult<()>;
}

fn session_key(sid: &str) -> String {
    format!("session:{}", sid)
}

fn visits_key(sid: &str) -> String {
    format!("session:{}:num_visits", sid)
}

#[derive(Clone)]
pub struct RedisSessionStore {
    client: Client,
    ttl_seconds: u64,
}

impl RedisSessionStore {
    /// Create a new Redis session store
    pub async fn new(url: &str, ttl_seconds: u64) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        // Test connection
        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(Self { client, ttl_seconds })
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn create(&self, sid: &str, user_id: i32) -> AppResult<()> {
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(session_key(sid), user_id, self.ttl_seconds)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store session in Redis: {}", e)))?;
        Ok(())
    }

    async fn user_id(&self, sid: &str) -> AppResult<Option<i32>> {
        let mut conn = self.connection().await?;
        let user_id: Option<i32> = conn
            .get(session_key(sid))
            .await
            .map_err(|e| AppError::Internal(format!("Failed to read session from Redis: {}", e)))?;
        Ok(user_id)
    }

    async fn incr_visits(&self, sid: &str) -> AppResult<i64> {
        let mut conn = self.connection().await?;
        let key = visits_key(sid);

        // Counter expires together with the session
        let (visits,): (i64,) = redis::pipe()
            .atomic()
            .incr(&key, 1)
            .cmd("EXPIRE")
            .arg(&key)
            .arg(self.ttl_seconds)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to update visit counter: {}", e)))?;

        Ok(visits)
    }

    async fn destroy(&self, sid: &str) -> AppResult<()> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(vec![session_key(sid), visits_key(sid)])
            .await
            .map_err(|e| AppError::Internal(format!("Failed to delete session from Redis: {}", e)))?;
        Ok(())
    }
}
