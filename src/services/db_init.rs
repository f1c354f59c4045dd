use mongodb::{
    bson::doc,
    options::IndexOptions,
    Database, IndexModel,
};

use crate::store::StoreError;

pub async fn ensure_indexes(db: &Database) -> Result<(), StoreError> {
    // users: one row per telegram account
    {
        let col = db.collection::<mongodb::bson::Document>("users");
        let model = IndexModel::builder()
            .keys(doc! { "telegram_id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        col.create_index(model, None).await?;
    }

    // alerts: monitor scan loads every active alert each startup
    {
        let col = db.collection::<mongodb::bson::Document>("alerts");
        let model = IndexModel::builder()
            .keys(doc! { "is_active": 1, "symbol": 1 })
            .build();

        col.create_index(model, None).await?;
    }

    // trades: journal is always read per user in execution order
    {
        let col = db.collection::<mongodb::bson::Document>("trades");
        let model = IndexModel::builder()
            .keys(doc! { "user_id": 1, "executed_at": 1 })
            .build();

        col.create_index(model, None).await?;
    }

    Ok(())
}
