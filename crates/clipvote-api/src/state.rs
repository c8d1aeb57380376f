//! Application state.

use std::sync::Arc;

use clipvote_db::DbPool;
use clipvote_media::Validator;
use clipvote_queue::{MessageQueue, RedisQueue};
use clipvote_storage::StorageManager;

use crate::auth::TokenManager;
use crate::config::{ApiConfig, JwtConfig};
use crate::error::ApiError;
use crate::services::{RankingService, UserService, VideoService, VoteService};
use crate::session::SessionStore;

/// The service layer, wired once at startup.
#[derive(Clone)]
pub struct Services {
    pub users: UserService,
    pub videos: VideoService,
    pub votes: VoteService,
    pub rankings: RankingService,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub pool: DbPool,
    pub storage: StorageManager,
    pub queue: Arc<dyn MessageQueue>,
    pub sessions: Arc<SessionStore>,
    pub jwt: Arc<TokenManager>,
    pub validator: Arc<Validator>,
    pub services: Services,
}

impl AppState {
    /// Create new application state from the environment.
    pub async fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let pool = clipvote_db::create_pool(&clipvote_db::DbConfig::from_env()).await?;

        let storage = StorageManager::from_env().await?;

        let queue = RedisQueue::from_env()?;
        queue.init().await?;
        let queue: Arc<dyn MessageQueue> = Arc::new(queue);

        let temp_dir = std::env::var("TEMP_DIR").unwrap_or_else(|_| "/tmp".to_string());
        let validator = Arc::new(Validator::new(temp_dir));
        let jwt = Arc::new(TokenManager::new(JwtConfig::from_env()?));

        let services = Services {
            users: UserService::new(pool.clone(), Arc::clone(&jwt)),
            videos: VideoService::new(
                pool.clone(),
                storage.clone(),
                Arc::clone(&queue),
                Arc::clone(&validator),
            ),
            votes: VoteService::new(pool.clone()),
            rankings: RankingService::new(pool.clone()),
        };

        Ok(Self {
            config,
            pool,
            storage,
            queue,
            sessions: Arc::new(SessionStore::new()),
            jwt,
            validator,
            services,
        })
    }
}
