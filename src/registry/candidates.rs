use sqlx::{Row, SqliteConnection, sqlite::SqliteRow};

use crate::error::{ElectionError, is_unique_violation};
use crate::models::Candidate;

/// Append a candidate and return its assigned ordinal index. Rejects a second
/// candidate sharing both party and position with an existing one.
pub async fn add(
    conn: &mut SqliteConnection,
    name: &str,
    party: &str,
    position: &str,
) -> Result<i64, ElectionError> {
    let taken = sqlx::query("SELECT 1 FROM candidates WHERE party = ? AND position = ?")
        .bind(party)
        .bind(position)
        .fetch_optional(&mut *conn)
        .await?
        .is_some();

    if taken {
        return Err(ElectionError::DuplicateCandidate {
            party: party.to_string(),
            position: position.to_string(),
        });
    }

    // Append-only table, so COUNT(*) is the next ordinal and indexes are
    // never reused. Stable inside the caller's transaction.
    let row = sqlx::query("SELECT COUNT(*) AS n FROM candidates")
        .fetch_one(&mut *conn)
        .await?;
    let index: i64 = row.get("n");

    let inserted = sqlx::query(
        r#"
        INSERT INTO candidates (idx, name, party, position, vote_count)
        VALUES (?, ?, ?, ?, 0)
        "#,
    )
    .bind(index)
    .bind(name)
    .bind(party)
    .bind(position)
    .execute(&mut *conn)
    .await;

    match inserted {
        Ok(_) => Ok(index),
        // Lost race against a concurrent insert for the same (party, position)
        Err(e) if is_unique_violation(&e) => Err(ElectionError::DuplicateCandidate {
            party: party.to_string(),
            position: position.to_string(),
        }),
        Err(e) => Err(e.into()),
    }
}

pub async fn get(conn: &mut SqliteConnection, index: i64) -> Result<Candidate, ElectionError> {
    sqlx::query(
        r#"
        SELECT idx, name, party, position, vote_count
        FROM candidates
        WHERE idx = ?
        "#,
    )
    .bind(index)
    .fetch_optional(&mut *conn)
    .await?
    .map(candidate_from_row)
    .ok_or(ElectionError::CandidateNotFound { index })
}

pub async fn count(conn: &mut SqliteConnection) -> Result<i64, ElectionError> {
    let row = sqlx::query("SELECT COUNT(*) AS n FROM candidates")
        .fetch_one(&mut *conn)
        .await?;
    Ok(row.get("n"))
}

pub async fn all(conn: &mut SqliteConnection) -> Result<Vec<Candidate>, ElectionError> {
    let rows = sqlx::query(
        r#"
        SELECT idx, name, party, position, vote_count
        FROM candidates
        ORDER BY idx
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.into_iter().map(candidate_from_row).collect())
}

pub async fn increment_vote(conn: &mut SqliteConnection, index: i64) -> Result<(), ElectionError> {
    let result = sqlx::query("UPDATE candidates SET vote_count = vote_count + 1 WHERE idx = ?")
        .bind(index)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ElectionError::CandidateNotFound { index });
    }
    Ok(())
}

fn candidate_from_row(row: SqliteRow) -> Candidate {
    Candidate {
        index: row.get::<i64, _>("idx"),
        name: row.get::<String, _>("name"),
        party: row.get::<String, _>("party"),
        position: row.get::<String, _>("position"),
        vote_count: row.get::<i64, _>("vote_count"),
    }
}
