use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::{
    error::{AppError, AppResult},
    models::{ActionKind, Interaction, InteractionEvent, NewInteraction},
};

/// A peer user ranked by how many of their interactions overlap a product set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserOverlap {
    pub user_id: String,
    pub interaction_count: i64,
}

/// A product ranked by how many interactions a user set produced against it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCount {
    pub product_id: i32,
    pub interaction_count: i64,
}

/// Read/write access to the interaction log
///
/// The recommendation pipeline only reads; `record_interaction` serves the
/// tracking endpoint. Store failures propagate as errors — the pipeline does
/// not mask data-layer outages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BehaviorStore: Send + Sync {
    /// Most recent interactions for a user, newest first, joined with the
    /// product's category and price
    async fn recent_interactions(
        &self,
        user_id: &str,
        limit: i64,
    ) -> AppResult<Vec<InteractionEvent>>;

    /// Appends an interaction record and returns it as stored
    async fn record_interaction(&self, interaction: NewInteraction) -> AppResult<Interaction>;

    /// Users (other than `exclude_user_id`) whose interactions of the given
    /// kinds touch `product_ids`, ranked by overlap count descending
    async fn group_by_user(
        &self,
        product_ids: &[i32],
        exclude_user_id: &str,
        actions: &[ActionKind],
        limit: i64,
    ) -> AppResult<Vec<UserOverlap>>;

    /// Products interacted with by `user_ids` (excluding
    /// `exclude_product_ids`), ranked by interaction count descending
    async fn group_by_product(
        &self,
        user_ids: &[String],
        exclude_product_ids: &[i32],
        actions: &[ActionKind],
        limit: i64,
    ) -> AppResult<Vec<ProductCount>>;
}

/// Postgres-backed behavior store
#[derive(Clone)]
pub struct PgBehaviorStore {
    pool: PgPool,
}

impl PgBehaviorStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct InteractionEventRow {
    product_id: i32,
    action: String,
    metadata: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    category: String,
    price: f64,
}

#[derive(sqlx::FromRow)]
struct InteractionRow {
    id: i64,
    user_id: Option<String>,
    session_id: String,
    product_id: i32,
    action: String,
    metadata: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct UserOverlapRow {
    user_id: String,
    interaction_count: i64,
}

#[derive(sqlx::FromRow)]
struct ProductCountRow {
    product_id: i32,
    interaction_count: i64,
}

fn action_strings(actions: &[ActionKind]) -> Vec<String> {
    actions.iter().map(|a| a.as_str().to_string()).collect()
}

#[async_trait]
impl BehaviorStore for PgBehaviorStore {
    async fn recent_interactions(
        &self,
        user_id: &str,
        limit: i64,
    ) -> AppResult<Vec<InteractionEvent>> {
        let rows = sqlx::query_as::<_, InteractionEventRow>(
            r#"
            SELECT i.product_id, i.action, i.metadata, i.created_at, p.category, p.price
            FROM interactions i
            JOIN products p ON p.id = i.product_id
            WHERE i.user_id = $1
            ORDER BY i.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        // A row with an unrecognized action kind is dropped rather than
        // failing the whole window read
        let events = rows
            .into_iter()
            .filter_map(|row| match row.action.parse::<ActionKind>() {
                Ok(action) => Some(InteractionEvent {
                    product_id: row.product_id,
                    action,
                    metadata: row.metadata,
                    created_at: row.created_at,
                    category: row.category,
                    price: row.price,
                }),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping interaction with unknown action kind");
                    None
                }
            })
            .collect();

        Ok(events)
    }

    async fn record_interaction(&self, interaction: NewInteraction) -> AppResult<Interaction> {
        let row = sqlx::query_as::<_, InteractionRow>(
            r#"
            INSERT INTO interactions (user_id, session_id, product_id, action, metadata, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, now(), $6)
            RETURNING id, user_id, session_id, product_id, action, metadata, created_at, expires_at
            "#,
        )
        .bind(&interaction.user_id)
        .bind(&interaction.session_id)
        .bind(interaction.product_id)
        .bind(interaction.action.as_str())
        .bind(&interaction.metadata)
        .bind(interaction.expires_at)
        .fetch_one(&self.pool)
        .await?;

        let action = row
            .action
            .parse::<ActionKind>()
            .map_err(AppError::Internal)?;

        Ok(Interaction {
            id: row.id,
            user_id: row.user_id,
            session_id: row.session_id,
            product_id: row.product_id,
            action,
            metadata: row.metadata,
            created_at: row.created_at,
            expires_at: row.expires_at,
        })
    }

    async fn group_by_user(
        &self,
        product_ids: &[i32],
        exclude_user_id: &str,
        actions: &[ActionKind],
        limit: i64,
    ) -> AppResult<Vec<UserOverlap>> {
        let rows = sqlx::query_as::<_, UserOverlapRow>(
            r#"
            SELECT i.user_id, COUNT(*) AS interaction_count
            FROM interactions i
            WHERE i.product_id = ANY($1)
              AND i.user_id IS NOT NULL
              AND i.user_id <> $2
              AND i.action = ANY($3)
            GROUP BY i.user_id
            ORDER BY interaction_count DESC, i.user_id ASC
            LIMIT $4
            "#,
        )
        .bind(product_ids)
        .bind(exclude_user_id)
        .bind(action_strings(actions))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| UserOverlap {
                user_id: row.user_id,
                interaction_count: row.interaction_count,
            })
            .collect())
    }

    async fn group_by_product(
        &self,
        user_ids: &[String],
        exclude_product_ids: &[i32],
        actions: &[ActionKind],
        limit: i64,
    ) -> AppResult<Vec<ProductCount>> {
        let rows = sqlx::query_as::<_, ProductCountRow>(
            r#"
            SELECT i.product_id, COUNT(*) AS interaction_count
            FROM interactions i
            WHERE i.user_id = ANY($1)
              AND NOT (i.product_id = ANY($2))
              AND i.action = ANY($3)
            GROUP BY i.product_id
            ORDER BY interaction_count DESC, i.product_id ASC
            LIMIT $4
            "#,
        )
        .bind(user_ids)
        .bind(exclude_product_ids)
        .bind(action_strings(actions))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ProductCount {
                product_id: row.product_id,
                interaction_count: row.interaction_count,
            })
            .collect())
    }
}
