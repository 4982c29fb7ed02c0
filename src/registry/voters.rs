use chrono::{DateTime, Utc};
use sqlx::{Row, SqliteConnection};

use crate::error::{ElectionError, is_unique_violation};
use crate::models::VoterRecord;

/// Mark a voter as registered. Registration is one-shot; a repeat attempt is
/// rejected, not ignored.
pub async fn register(conn: &mut SqliteConnection, voter_id: i64) -> Result<VoterRecord, ElectionError> {
    if is_registered(&mut *conn, voter_id).await? {
        return Err(ElectionError::AlreadyRegistered { voter_id });
    }

    let record = VoterRecord {
        voter_id,
        registered_at: Utc::now(),
    };

    let inserted = sqlx::query("INSERT INTO voters (voter_id, registered_at) VALUES (?, ?)")
        .bind(record.voter_id)
        .bind(record.registered_at.to_rfc3339())
        .execute(&mut *conn)
        .await;

    match inserted {
        Ok(_) => Ok(record),
        Err(e) if is_unique_violation(&e) => Err(ElectionError::AlreadyRegistered { voter_id }),
        Err(e) => Err(e.into()),
    }
}

pub async fn is_registered(conn: &mut SqliteConnection, voter_id: i64) -> Result<bool, ElectionError> {
    let row = sqlx::query("SELECT 1 FROM voters WHERE voter_id = ?")
        .bind(voter_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.is_some())
}

pub async fn get(
    conn: &mut SqliteConnection,
    voter_id: i64,
) -> Result<Option<VoterRecord>, ElectionError> {
    let row = sqlx::query("SELECT voter_id, registered_at FROM voters WHERE voter_id = ?")
        .bind(voter_id)
        .fetch_optional(&mut *conn)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let registered_at_str = row.get::<String, _>("registered_at");
    let registered_at = DateTime::parse_from_rfc3339(&registered_at_str)
        .map_err(|e| sqlx::Error::ColumnDecode {
            index: "registered_at".to_string(),
            source: Box::new(e),
        })?
        .with_timezone(&Utc);

    Ok(Some(VoterRecord {
        voter_id: row.get::<i64, _>("voter_id"),
        registered_at,
    }))
}
