use async_trait::async_trait;
use chrono::Utc;
use futures_util::StreamExt;
use mongodb::{
    bson::{doc, Document},
    options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument},
    Client, Collection, Database,
};

use super::{AlertState, Store, StoreError};
use crate::{
    models::{AccessLevel, Alert, NewAlert, NewTrade, Trade, User},
    services::db_init,
};

#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    /// Connects and makes sure the indexes the services rely on exist.
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        let db = client.database(db_name);
        db_init::ensure_indexes(&db).await?;
        Ok(Self { db })
    }

    pub fn from_database(db: Database) -> Self {
        Self { db }
    }

    fn users(&self) -> Collection<User> {
        self.db.collection::<User>("users")
    }

    fn alerts(&self) -> Collection<Alert> {
        self.db.collection::<Alert>("alerts")
    }

    fn trades(&self) -> Collection<Trade> {
        self.db.collection::<Trade>("trades")
    }

    /// Mongo has no autoincrement; keep one sequence document per collection.
    async fn next_id(&self, collection: &str) -> Result<i64, StoreError> {
        let counters = self.db.collection::<Document>("counters");
        let opts = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        let seq = counters
            .find_one_and_update(doc! { "_id": collection }, doc! { "$inc": { "seq": 1_i64 } }, opts)
            .await?
            .and_then(|d| d.get_i64("seq").ok())
            .unwrap_or(1);

        Ok(seq)
    }
}

async fn collect<T>(mut cursor: mongodb::Cursor<T>) -> Result<Vec<T>, StoreError>
where
    T: serde::de::DeserializeOwned + Unpin + Send + Sync,
{
    let mut out = Vec::new();
    while let Some(item) = cursor.next().await {
        out.push(item?);
    }
    Ok(out)
}

#[async_trait]
impl Store for MongoStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.db.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }

    async fn find_user(&self, user_id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.users().find_one(doc! { "_id": user_id }, None).await?)
    }

    async fn find_user_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>, StoreError> {
        Ok(self
            .users()
            .find_one(doc! { "telegram_id": telegram_id }, None)
            .await?)
    }

    async fn insert_user(&self, telegram_id: i64, access_level: AccessLevel) -> Result<User, StoreError> {
        let user = User {
            id: self.next_id("users").await?,
            telegram_id,
            access_level,
            created_at: Utc::now().timestamp(),
        };

        if let Err(e) = self.users().insert_one(&user, None).await {
            if e.to_string().contains("E11000") {
                return Err(StoreError::Duplicate(format!("telegram_id {telegram_id}")));
            }
            return Err(e.into());
        }

        Ok(user)
    }

    async fn set_access_level(&self, user_id: i64, level: AccessLevel) -> Result<bool, StoreError> {
        let res = self
            .users()
            .update_one(
                doc! { "_id": user_id },
                doc! { "$set": { "access_level": level.as_str() } },
                None,
            )
            .await?;
        Ok(res.matched_count > 0)
    }

    async fn insert_alert(&self, alert: NewAlert) -> Result<Alert, StoreError> {
        let alert = alert.into_alert(self.next_id("alerts").await?);
        self.alerts().insert_one(&alert, None).await?;
        Ok(alert)
    }

    async fn active_alerts(&self) -> Result<Vec<Alert>, StoreError> {
        let opts = FindOptions::builder().sort(doc! { "_id": 1 }).build();
        let cursor = self.alerts().find(doc! { "is_active": true }, opts).await?;
        collect(cursor).await
    }

    async fn delete_alert(&self, user_id: i64, alert_id: i64) -> Result<bool, StoreError> {
        let res = self
            .alerts()
            .delete_one(doc! { "_id": alert_id, "user_id": user_id }, None)
            .await?;
        Ok(res.deleted_count > 0)
    }

    async fn update_alert_state(&self, alert_id: i64, state: AlertState) -> Result<(), StoreError> {
        self.alerts()
            .update_one(
                doc! { "_id": alert_id },
                doc! {
                    "$set": {
                        "is_active": state.is_active,
                        "triggered": state.triggered,
                        "triggered_at": state.triggered_at,
                    }
                },
                None,
            )
            .await?;
        Ok(())
    }

    async fn insert_trade(&self, trade: NewTrade) -> Result<Trade, StoreError> {
        let trade = trade.into_trade(self.next_id("trades").await?);
        self.trades().insert_one(&trade, None).await?;
        Ok(trade)
    }

    async fn trades_for_user(&self, user_id: i64) -> Result<Vec<Trade>, StoreError> {
        let opts = FindOptions::builder()
            .sort(doc! { "executed_at": 1, "_id": 1 })
            .build();
        let cursor = self.trades().find(doc! { "user_id": user_id }, opts).await?;
        collect(cursor).await
    }

    async fn delete_trade(&self, user_id: i64, trade_id: i64) -> Result<bool, StoreError> {
        let res = self
            .trades()
            .delete_one(doc! { "_id": trade_id, "user_id": user_id }, None)
            .await?;
        Ok(res.deleted_count > 0)
    }
}
