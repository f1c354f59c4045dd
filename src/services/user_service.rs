use std::{collections::HashSet, sync::Arc};

use crate::{
    error::{Result, ServiceError},
    models::{AccessLevel, User},
    store::{Store, StoreError},
};

pub struct UserService {
    store: Arc<dyn Store>,
    admins: HashSet<i64>,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>, admin_telegram_ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            store,
            admins: admin_telegram_ids.into_iter().collect(),
        }
    }

    /// Users are created on their first interaction with the bot.
    pub async fn get_or_create(&self, telegram_id: i64) -> Result<User> {
        if let Some(u) = self.store.find_user_by_telegram_id(telegram_id).await? {
            return Ok(u);
        }

        let level = if self.admins.contains(&telegram_id) {
            AccessLevel::Admin
        } else {
            AccessLevel::Basic
        };

        match self.store.insert_user(telegram_id, level).await {
            Ok(u) => {
                tracing::info!(user_id = u.id, telegram_id, access_level = %u.access_level, "user created");
                Ok(u)
            }
            // lost a race with a concurrent first message
            Err(StoreError::Duplicate(_)) => self
                .store
                .find_user_by_telegram_id(telegram_id)
                .await?
                .ok_or_else(|| ServiceError::not_found(format!("user {telegram_id} not found"))),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find(&self, user_id: i64) -> Result<Option<User>> {
        Ok(self.store.find_user(user_id).await?)
    }

    pub async fn set_access_level(
        &self,
        actor_telegram_id: i64,
        target_telegram_id: i64,
        level: AccessLevel,
    ) -> Result<User> {
        let actor = self.get_or_create(actor_telegram_id).await?;
        if actor.access_level != AccessLevel::Admin {
            return Err(ServiceError::Forbidden(
                "only admins can change access levels".to_string(),
            ));
        }

        let mut target = self.get_or_create(target_telegram_id).await?;
        self.store.set_access_level(target.id, level).await?;
        target.access_level = level;

        tracing::info!(
            actor = actor_telegram_id,
            target = target_telegram_id,
            access_level = %level,
            "access level changed"
        );
        Ok(target)
    }
}
