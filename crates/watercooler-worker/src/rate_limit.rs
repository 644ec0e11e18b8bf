//! Fixed-window request limiter backed by the `rate_limits` table.
//!
//! Counters live in the database so every Worker isolate sees the same window.

use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use tracing::{debug, info, warn};

use entity::rate_limit;

use crate::error::ClaimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: i32,
    /// Unix timestamp (seconds) at which the current window closes.
    pub reset_at: i64,
}

impl RateLimitDecision {
    pub fn retry_after(&self, now: i64) -> i64 {
        (self.reset_at - now).max(1)
    }

    pub fn into_result(self, now: i64) -> Result<Self, ClaimError> {
        if self.allowed {
            Ok(self)
        } else {
            Err(ClaimError::RateLimited {
                retry_after: self.retry_after(now),
            })
        }
    }
}

/// Re-reads allowed when a concurrent request changes the row between our read
/// and our write.
const MAX_COUNT_ATTEMPTS: u32 = 3;

/// Count one request against `key` and report whether it may proceed.
///
/// Every write is conditional on the row still looking the way it was read, so
/// concurrent isolates cannot overwrite each other's increments.
pub async fn check_rate_limit<C>(
    db: &C,
    key: &str,
    max: i32,
    window_secs: i64,
    now: i64,
) -> Result<RateLimitDecision, ClaimError>
where
    C: TransactionTrait,
{
    let txn = db.begin().await?;

    let mut decision = None;
    for attempt in 1..=MAX_COUNT_ATTEMPTS {
        let seen = rate_limit::Entity::find_by_id(key.to_string())
            .one(&txn)
            .await?;
        decision = count_request(&txn, key, max, window_secs, now, seen.as_ref()).await?;
        if decision.is_some() {
            break;
        }
        debug!(key, attempt, "Rate limit row changed concurrently, re-reading");
    }

    txn.commit().await?;

    Ok(decision.unwrap_or_else(|| {
        warn!(key, "Rate limit row kept changing; denying request");
        RateLimitDecision {
            allowed: false,
            remaining: 0,
            reset_at: now + window_secs,
        }
    }))
}

/// One attempt at counting a request against the row as it was read.
///
/// Returns `None` when the stored row no longer matches `seen`.
async fn count_request<C>(
    db: &C,
    key: &str,
    max: i32,
    window_secs: i64,
    now: i64,
    seen: Option<&rate_limit::Model>,
) -> Result<Option<RateLimitDecision>, ClaimError>
where
    C: ConnectionTrait,
{
    let opened = RateLimitDecision {
        allowed: true,
        remaining: max - 1,
        reset_at: now + window_secs,
    };

    match seen {
        None => {
            let inserted = rate_limit::Entity::insert(rate_limit::ActiveModel {
                key: Set(key.to_string()),
                window_start: Set(now),
                count: Set(1),
            })
            .on_conflict(
                OnConflict::column(rate_limit::Column::Key)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;

            Ok((inserted == 1).then_some(opened))
        }
        Some(row) if now >= row.window_start + window_secs => {
            let reset = rate_limit::Entity::update_many()
                .col_expr(rate_limit::Column::WindowStart, Expr::value(now))
                .col_expr(rate_limit::Column::Count, Expr::value(1))
                .filter(rate_limit::Column::Key.eq(key))
                .filter(rate_limit::Column::WindowStart.eq(row.window_start))
                .exec(db)
                .await?;

            Ok((reset.rows_affected == 1).then_some(opened))
        }
        Some(row) if row.count >= max => {
            debug!(key, "Rate limit window full");
            Ok(Some(RateLimitDecision {
                allowed: false,
                remaining: 0,
                reset_at: row.window_start + window_secs,
            }))
        }
        Some(row) => {
            let bumped = rate_limit::Entity::update_many()
                .col_expr(
                    rate_limit::Column::Count,
                    Expr::col(rate_limit::Column::Count).add(1),
                )
                .filter(rate_limit::Column::Key.eq(key))
                .filter(rate_limit::Column::WindowStart.eq(row.window_start))
                .filter(rate_limit::Column::Count.eq(row.count))
                .exec(db)
                .await?;

            Ok((bumped.rows_affected == 1).then(|| RateLimitDecision {
                allowed: true,
                remaining: max - row.count - 1,
                reset_at: row.window_start + window_secs,
            }))
        }
    }
}

/// Drop counters whose window closed before `now`.
pub async fn sweep_rate_limits<C>(db: &C, window_secs: i64, now: i64) -> Result<u64, ClaimError>
where
    C: ConnectionTrait,
{
    let deleted = rate_limit::Entity::delete_many()
        .filter(rate_limit::Column::WindowStart.lte(now - window_secs))
        .exec(db)
        .await?
        .rows_affected;

    info!(deleted, "Swept rate limit windows");
    Ok(deleted)
}

/// Identify the calling client from proxy headers.
///
/// Cloudflare's `CF-Connecting-IP` wins, then the first `X-Forwarded-For`
/// hop, then `X-Real-IP`.
pub fn client_identifier<F>(header: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |v: String| {
        let v = v.trim().to_string();
        (!v.is_empty()).then_some(v)
    };

    header("CF-Connecting-IP")
        .and_then(non_empty)
        .or_else(|| {
            header("X-Forwarded-For")
                .and_then(|v| v.split(',').next().map(str::to_string))
                .and_then(non_empty)
        })
        .or_else(|| header("X-Real-IP").and_then(non_empty))
        .unwrap_or_else(|| "unknown".to_string())
}
