use std::sync::Arc;

use sqlx::PgPool;

use crate::core::{config::Settings, redis::RedisHandle};
use crate::services::ai_evaluation::AiEvaluationService;
use crate::services::storage::StorageService;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    db: PgPool,
    redis: RedisHandle,
    storage: StorageService,
    evaluator: AiEvaluationService,
}

impl AppState {
    pub(crate) fn new(
        settings: Settings,
        db: PgPool,
        redis: RedisHandle,
        storage: StorageService,
        evaluator: AiEvaluationService,
    ) -> Self {
        Self { inner: Arc::new(InnerState { settings, db, redis, storage, evaluator }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn db(&self) -> &PgPool {
        &self.inner.db
    }

    pub(crate) fn redis(&self) -> &RedisHandle {
        &self.inner.redis
    }

    pub(crate) fn storage(&self) -> &StorageService {
        &self.inner.storage
    }

    pub(crate) fn evaluator(&self) -> &AiEvaluationService {
        &self.inner.evaluator
    }
}
