//! Per-user calculation statistics

use std::collections::HashMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::infrastructure::database::entities::calculation;

/// How many recent calculations to include in the stats response
const RECENT_LIMIT: usize = 5;

/// Aggregated statistics over a user's calculation history
#[derive(Debug, Serialize, ToSchema)]
pub struct UserStats {
    pub total: u64,
    pub avg_a: f64,
    pub avg_b: f64,
    /// Count of calculations per operation kind
    pub counts: HashMap<String, u64>,
    /// The most recent calculations, newest first
    pub recent: Vec<RecentCalculation>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecentCalculation {
    pub id: i64,
    pub a: f64,
    pub b: f64,
    #[serde(rename = "type")]
    pub operation: String,
    pub result: f64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Compute statistics from a user's calculation rows.
///
/// `rows` must already be filtered to a single owner and ordered newest
/// first; the caller (handler) owns that query.
pub fn compute(rows: &[calculation::Model]) -> UserStats {
    let total = rows.len() as u64;

    let (avg_a, avg_b) = if rows.is_empty() {
        (0.0, 0.0)
    } else {
        let sum_a: f64 = rows.iter().map(|r| r.a).sum();
        let sum_b: f64 = rows.iter().map(|r| r.b).sum();
        (sum_a / total as f64, sum_b / total as f64)
    };

    let mut counts: HashMap<String, u64> = HashMap::new();
    for row in rows {
        *counts.entry(row.operation.clone()).or_default() += 1;
    }

    let recent = rows
        .iter()
        .take(RECENT_LIMIT)
        .map(|r| RecentCalculation {
            id: r.id,
            a: r.a,
            b: r.b,
            operation: r.operation.clone(),
            result: r.result,
            timestamp: r.created_at,
        })
        .collect();

    UserStats {
        total,
        avg_a,
        avg_b,
        counts,
        recent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn row(id: i64, a: f64, b: f64, operation: &str) -> calculation::Model {
        calculation::Model {
            id,
            a,
            b,
            operation: operation.to_string(),
            result: 0.0,
            created_at: Utc::now(),
            user_id: 1,
        }
    }

    #[test]
    fn empty_history_yields_zeroes() {
        let stats = compute(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.avg_a, 0.0);
        assert_eq!(stats.avg_b, 0.0);
        assert!(stats.counts.is_empty());
        assert!(stats.recent.is_empty());
    }

    #[test]
    fn aggregates_counts_and_averages() {
        let rows = vec![
            row(3, 10.0, 5.0, "add"),
            row(2, 20.0, 15.0, "add"),
            row(1, 30.0, 10.0, "divide"),
        ];
        let stats = compute(&rows);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.avg_a, 20.0);
        assert_eq!(stats.avg_b, 10.0);
        assert_eq!(stats.counts["add"], 2);
        assert_eq!(stats.counts["divide"], 1);
    }

    #[test]
    fn recent_is_capped_and_preserves_order() {
        let rows: Vec<_> = (0..8).map(|i| row(8 - i, 1.0, 1.0, "add")).collect();
        let stats = compute(&rows);
        assert_eq!(stats.recent.len(), RECENT_LIMIT);
        assert_eq!(stats.recent[0].id, 8);
        assert_eq!(stats.recent[4].id, 4);
    }
}
