//! Player record queries
//!
//! Point lookups, batched set lookups for queue enrichment, and the single
//! mutation this subsystem performs on a player row: writing the confirmed
//! cross-reference on approval.

use sqlx::{Row, SqlitePool};
use std::collections::HashMap;

use spir_common::db::{MarketPlayer, StatsPlayer};
use spir_common::{Error, Result};

use super::placeholders;

fn map_market_row(row: &sqlx::sqlite::SqliteRow) -> MarketPlayer {
    MarketPlayer {
        id: row.get("id"),
        name: row.get("name"),
        club_name: row.get("club_name"),
        club_logo_url: row.get("club_logo_url"),
        profile_url: row.get("profile_url"),
        date_of_birth: row.get("date_of_birth"),
        nationality: row.get("nationality"),
        position: row.get("position"),
        photo_url: row.get("photo_url"),
        stats_player_id: row.get("stats_player_id"),
    }
}

fn map_stats_row(row: &sqlx::sqlite::SqliteRow) -> StatsPlayer {
    StatsPlayer {
        id: row.get("id"),
        name: row.get("name"),
        team_name: row.get("team_name"),
        profile_url: row.get("profile_url"),
        date_of_birth: row.get("date_of_birth"),
        nationality: row.get("nationality"),
        position: row.get("position"),
        photo_url: row.get("photo_url"),
    }
}

/// Load a market player by id
pub async fn load_market_player(pool: &SqlitePool, id: &str) -> Result<Option<MarketPlayer>> {
    let row = sqlx::query("SELECT * FROM market_players WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(map_market_row))
}

/// Load a stats player by id
pub async fn load_stats_player(pool: &SqlitePool, id: &str) -> Result<Option<StatsPlayer>> {
    let row = sqlx::query("SELECT * FROM stats_players WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(map_stats_row))
}

/// Batched market player lookup, keyed by id
///
/// Ids with no matching row are simply absent from the returned map.
pub async fn load_market_players(
    pool: &SqlitePool,
    ids: &[String],
) -> Result<HashMap<String, MarketPlayer>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let sql = format!(
        "SELECT * FROM market_players WHERE id IN ({})",
        placeholders(ids.len())
    );
    let mut query = sqlx::query(&sql);
    for id in ids {
        query = query.bind(id);
    }

    let rows = query.fetch_all(pool).await?;
    Ok(rows
        .iter()
        .map(|row| {
            let player = map_market_row(row);
            (player.id.clone(), player)
        })
        .collect())
}

/// Batched stats player lookup, keyed by id
pub async fn load_stats_players(
    pool: &SqlitePool,
    ids: &[String],
) -> Result<HashMap<String, StatsPlayer>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let sql = format!(
        "SELECT * FROM stats_players WHERE id IN ({})",
        placeholders(ids.len())
    );
    let mut query = sqlx::query(&sql);
    for id in ids {
        query = query.bind(id);
    }

    let rows = query.fetch_all(pool).await?;
    Ok(rows
        .iter()
        .map(|row| {
            let player = map_stats_row(row);
            (player.id.clone(), player)
        })
        .collect())
}

/// Write the confirmed cross-reference onto a market player row
///
/// Runs on any executor so the approve workflow can include it in its
/// transaction.
pub async fn set_cross_reference<'e, E>(
    executor: E,
    market_player_id: &str,
    stats_player_id: &str,
) -> Result<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let result = sqlx::query("UPDATE market_players SET stats_player_id = ? WHERE id = ?")
        .bind(stats_player_id)
        .bind(market_player_id)
        .execute(executor)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!(
            "Market player not found: {}",
            market_player_id
        )));
    }

    Ok(())
}

/// Save a market player (insert or replace)
pub async fn save_market_player(pool: &SqlitePool, player: &MarketPlayer) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO market_players (
            id, name, club_name, club_logo_url, profile_url,
            date_of_birth, nationality, position, photo_url, stats_player_id
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            club_name = excluded.club_name,
            club_logo_url = excluded.club_logo_url,
            profile_url = excluded.profile_url,
            date_of_birth = excluded.date_of_birth,
            nationality = excluded.nationality,
            position = excluded.position,
            photo_url = excluded.photo_url
        "#,
    )
    .bind(&player.id)
    .bind(&player.name)
    .bind(&player.club_name)
    .bind(&player.club_logo_url)
    .bind(&player.profile_url)
    .bind(&player.date_of_birth)
    .bind(&player.nationality)
    .bind(&player.position)
    .bind(&player.photo_url)
    .bind(&player.stats_player_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Save a stats player (insert or replace)
pub async fn save_stats_player(pool: &SqlitePool, player: &StatsPlayer) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO stats_players (
            id, name, team_name, profile_url,
            date_of_birth, nationality, position, photo_url
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            team_name = excluded.team_name,
            profile_url = excluded.profile_url,
            date_of_birth = excluded.date_of_birth,
            nationality = excluded.nationality,
            position = excluded.position,
            photo_url = excluded.photo_url
        "#,
    )
    .bind(&player.id)
    .bind(&player.name)
    .bind(&player.team_name)
    .bind(&player.profile_url)
    .bind(&player.date_of_birth)
    .bind(&player.nationality)
    .bind(&player.position)
    .bind(&player.photo_url)
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        spir_common::db::init_tables(&pool)
            .await
            .expect("Failed to init tables");
        pool
    }

    fn market_player(id: &str, name: &str) -> MarketPlayer {
        MarketPlayer {
            id: id.to_string(),
            name: name.to_string(),
            club_name: Some("FC Test".to_string()),
            club_logo_url: None,
            profile_url: None,
            date_of_birth: Some("2001-04-17".to_string()),
            nationality: Some("Brazil".to_string()),
            position: Some("Centre-Back".to_string()),
            photo_url: None,
            stats_player_id: None,
        }
    }

    #[tokio::test]
    async fn test_save_and_load_market_player() {
        let pool = test_pool().await;
        save_market_player(&pool, &market_player("tm-1", "João Silva"))
            .await
            .unwrap();

        let loaded = load_market_player(&pool, "tm-1").await.unwrap().unwrap();
        assert_eq!(loaded.name, "João Silva");
        assert!(loaded.stats_player_id.is_none());

        assert!(load_market_player(&pool, "tm-missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_batched_lookup_skips_missing_ids() {
        let pool = test_pool().await;
        save_market_player(&pool, &market_player("tm-1", "A")).await.unwrap();
        save_market_player(&pool, &market_player("tm-2", "B")).await.unwrap();

        let map = load_market_players(
            &pool,
            &["tm-1".to_string(), "tm-2".to_string(), "tm-ghost".to_string()],
        )
        .await
        .unwrap();

        assert_eq!(map.len(), 2);
        assert!(map.contains_key("tm-1"));
        assert!(!map.contains_key("tm-ghost"));
    }

    #[tokio::test]
    async fn test_set_cross_reference() {
        let pool = test_pool().await;
        save_market_player(&pool, &market_player("tm-1", "A")).await.unwrap();

        set_cross_reference(&pool, "tm-1", "sf-9").await.unwrap();
        let loaded = load_market_player(&pool, "tm-1").await.unwrap().unwrap();
        assert_eq!(loaded.stats_player_id.as_deref(), Some("sf-9"));

        let err = set_cross_reference(&pool, "tm-ghost", "sf-9").await;
        assert!(matches!(err, Err(Error::NotFound(_))));
    }
}
