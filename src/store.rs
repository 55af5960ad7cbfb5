use serenity::async_trait;
use sqlx::any::{AnyKind, AnyPool, AnyPoolOptions};
use tracing::info;

use crate::config::Config;
use crate::error::Result;

/// Persistence for Discord to Steam identity links.
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Inserts the link, or replaces the Steam ID already stored for `discord_id`.
    async fn upsert(&self, discord_id: &str, steam_id: &str) -> Result<()>;
}

pub struct SqlLinkStore {
    pool: AnyPool,
    table: String,
}

impl SqlLinkStore {
    pub async fn connect(config: &Config) -> Result<Self> {
        let pool = AnyPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(config.database.connect_options()?)
            .await?;

        Ok(Self::new(pool, config.table.clone()))
    }

    /// `table` must already be a validated identifier.
    pub fn new(pool: AnyPool, table: String) -> Self {
        Self { pool, table }
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {} (DiscordID VARCHAR(20) NOT NULL PRIMARY KEY, SteamID VARCHAR(17) NOT NULL);",
            self.table
        ))
        .execute(&self.pool)
        .await?;

        info!(table = %self.table, "Link table ready");
        Ok(())
    }

    #[cfg(test)]
    pub async fn find(&self, discord_id: &str) -> Result<Option<String>> {
        let steam_id = sqlx::query_scalar::<_, String>(&format!(
            "SELECT SteamID FROM {} WHERE DiscordID = ?;",
            self.table
        ))
        .bind(discord_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(steam_id)
    }

    fn upsert_sql(&self) -> String {
        match self.pool.any_kind() {
            AnyKind::MySql => format!(
                "INSERT INTO {} (DiscordID, SteamID) VALUES (?, ?) ON DUPLICATE KEY UPDATE SteamID = VALUES(SteamID);",
                self.table
            ),
            AnyKind::Sqlite => format!(
                "INSERT INTO {} (DiscordID, SteamID) VALUES (?, ?) ON CONFLICT(DiscordID) DO UPDATE SET SteamID = excluded.SteamID;",
                self.table
            ),
        }
    }
}

#[async_trait]
impl LinkStore for SqlLinkStore {
    async fn upsert(&self, discord_id: &str, steam_id: &str) -> Result<()> {
        sqlx::query(&self.upsert_sql())
            .bind(discord_id)
            .bind(steam_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::str::FromStr;

    use sqlx::any::AnyConnectOptions;
    use sqlx::Row;

    use super::*;

    pub(crate) async fn memory_store() -> SqlLinkStore {
        // A single connection that never idles out, so the in-memory database survives the test.
        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(AnyConnectOptions::from_str("sqlite::memory:").unwrap())
            .await
            .unwrap();

        let store = SqlLinkStore::new(pool, "steam_links".to_string());
        store.ensure_schema().await.unwrap();
        store
    }

    async fn row_count(store: &SqlLinkStore) -> i64 {
        sqlx::query("SELECT COUNT(*) FROM steam_links;")
            .fetch_one(&store.pool)
            .await
            .unwrap()
            .get::<i64, _>(0)
    }

    #[tokio::test]
    async fn test_upsert_same_pair_twice_keeps_one_row() {
        let store = memory_store().await;

        store.upsert("1234", "76561198012345678").await.unwrap();
        store.upsert("1234", "76561198012345678").await.unwrap();

        assert_eq!(row_count(&store).await, 1);
        assert_eq!(store.find("1234").await.unwrap().as_deref(), Some("76561198012345678"));
    }

    #[tokio::test]
    async fn test_upsert_overwrites_steam_id() {
        let store = memory_store().await;

        store.upsert("1234", "76561198012345678").await.unwrap();
        store.upsert("1234", "76561197900000001").await.unwrap();

        assert_eq!(row_count(&store).await, 1);
        assert_eq!(store.find("1234").await.unwrap().as_deref(), Some("76561197900000001"));
    }

    #[tokio::test]
    async fn test_links_are_keyed_per_user() {
        let store = memory_store().await;

        store.upsert("1", "76561198000000001").await.unwrap();
        store.upsert("2", "76561198000000001").await.unwrap();

        assert_eq!(row_count(&store).await, 2);
        assert_eq!(store.find("3").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_ensure_schema_is_repeatable() {
        let store = memory_store().await;
        store.upsert("1", "76561198000000001").await.unwrap();

        store.ensure_schema().await.unwrap();

        assert_eq!(row_count(&store).await, 1);
    }
}
