use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

/// Which signup flow a subscriber came through. Each flow keeps its own list.
#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display)]
#[sqlx(type_name = "subscriber_list", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SubscriberList {
    /// Footer signup form (`/api/subscribe`)
    Website,
    /// Newsletter section (`/api/newsletter`)
    Newsletter,
    /// Key-value list keyed by exact email (`/api/subscribe-redis`)
    Toolcurator,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Subscriber {
    #[ts(type = "string")]
    pub id: Uuid,
    pub list: SubscriberList,
    pub email: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl Subscriber {
    pub async fn create(
        pool: &SqlitePool,
        list: SubscriberList,
        email: &str,
    ) -> Result<Self, sqlx::Error> {
        let subscriber = Subscriber {
            id: Uuid::new_v4(),
            list,
            email: email.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"INSERT INTO subscribers (id, list, email, created_at)
               VALUES ($1, $2, $3, $4)"#,
        )
        .bind(subscriber.id)
        .bind(subscriber.list)
        .bind(&subscriber.email)
        .bind(subscriber.created_at)
        .execute(pool)
        .await?;

        Ok(subscriber)
    }

    /// Every stored email on a list, in insertion order.
    pub async fn emails(pool: &SqlitePool, list: SubscriberList) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            r#"SELECT email FROM subscribers WHERE list = $1 ORDER BY rowid ASC"#,
        )
        .bind(list)
        .fetch_all(pool)
        .await
    }

    /// Exact (case-sensitive) lookup of an email on a list.
    pub async fn find_by_email(
        pool: &SqlitePool,
        list: SubscriberList,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Subscriber>(
            r#"SELECT id, list, email, created_at
               FROM subscribers
               WHERE list = $1 AND email = $2
               LIMIT 1"#,
        )
        .bind(list)
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    pub async fn count(pool: &SqlitePool, list: SubscriberList) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM subscribers WHERE list = $1"#)
            .bind(list)
            .fetch_one(pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DBService;

    #[tokio::test]
    async fn create_and_find_subscriber() {
        let db = DBService::new_in_memory().await.unwrap();

        let created = Subscriber::create(&db.pool, SubscriberList::Toolcurator, "fan@example.com")
            .await
            .unwrap();

        let found = Subscriber::find_by_email(&db.pool, SubscriberList::Toolcurator, "fan@example.com")
            .await
            .unwrap()
            .expect("subscriber should exist");
        assert_eq!(found.id, created.id);
        assert_eq!(found.list, SubscriberList::Toolcurator);

        // Lookups are exact and scoped to the list.
        assert!(
            Subscriber::find_by_email(&db.pool, SubscriberList::Toolcurator, "FAN@example.com")
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            Subscriber::find_by_email(&db.pool, SubscriberList::Website, "fan@example.com")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn emails_are_listed_per_list() {
        let db = DBService::new_in_memory().await.unwrap();

        Subscriber::create(&db.pool, SubscriberList::Newsletter, "a@example.com").await.unwrap();
        Subscriber::create(&db.pool, SubscriberList::Newsletter, "b@example.com").await.unwrap();
        Subscriber::create(&db.pool, SubscriberList::Website, "c@example.com").await.unwrap();

        let emails = Subscriber::emails(&db.pool, SubscriberList::Newsletter).await.unwrap();
        assert_eq!(emails, vec!["a@example.com", "b@example.com"]);
        assert_eq!(Subscriber::count(&db.pool, SubscriberList::Website).await.unwrap(), 1);
    }
}
