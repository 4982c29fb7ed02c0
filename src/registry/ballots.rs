use chrono::Utc;
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::error::{ElectionError, is_unique_violation};
use crate::models::BallotEntry;

// One-directional per (voter, position): NotVoted -> Voted, no reset path.

pub async fn has_voted(
    conn: &mut SqliteConnection,
    voter_id: i64,
    position: &str,
) -> Result<bool, ElectionError> {
    let row = sqlx::query("SELECT 1 FROM ballots WHERE voter_id = ? AND position = ?")
        .bind(voter_id)
        .bind(position)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.is_some())
}

/// Record that the voter has voted for the position. The composite primary
/// key turns a lost race into the same rejection a sequential repeat gets.
pub async fn record(
    conn: &mut SqliteConnection,
    voter_id: i64,
    position: &str,
) -> Result<BallotEntry, ElectionError> {
    let entry = BallotEntry {
        voter_id,
        position: position.to_string(),
        receipt: Uuid::new_v4(),
        cast_at: Utc::now(),
    };

    let inserted = sqlx::query(
        "INSERT INTO ballots (voter_id, position, receipt, cast_at) VALUES (?, ?, ?, ?)",
    )
    .bind(entry.voter_id)
    .bind(&entry.position)
    .bind(entry.receipt.to_string())
    .bind(entry.cast_at.to_rfc3339())
    .execute(&mut *conn)
    .await;

    match inserted {
        Ok(_) => Ok(entry),
        Err(e) if is_unique_violation(&e) => Err(ElectionError::AlreadyVoted {
            voter_id,
            position: position.to_string(),
        }),
        Err(e) => Err(e.into()),
    }
}
