//! Outbound user notifications.
//!
//! Fire-and-forget: a notifier failure must never roll back the state
//! transition that triggered it, so the lifecycle service logs and moves on.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::NotificationKind;
use crate::store::LifecycleStore;
use crate::utils::error::AppError;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(
        &self,
        user_id: Uuid,
        title: &str,
        message: &str,
        kind: NotificationKind,
    ) -> Result<(), AppError>;
}

/// Persists notifications as rows the frontend polls for.
pub struct StoreNotifier {
    store: Arc<dyn LifecycleStore>,
}

impl StoreNotifier {
    pub fn new(store: Arc<dyn LifecycleStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Notifier for StoreNotifier {
    async fn notify(
        &self,
        user_id: Uuid,
        title: &str,
        message: &str,
        kind: NotificationKind,
    ) -> Result<(), AppError> {
        self.store
            .insert_notification(user_id, title, message, kind)
            .await
    }
}
