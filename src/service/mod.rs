use log::info;
use sqlx::sqlite::SqlitePool;

use crate::db::Database;
use crate::error::ElectionError;
use crate::models::{BallotEntry, Candidate, VoterRecord};
use crate::registry::{ballots, candidates, voters};

/// The one entry point for election operations. Every mutating call runs as a
/// single transaction, so a rejection leaves no partial state behind and no
/// two racing duplicates can both commit.
#[derive(Clone)]
pub struct VotingService {
    pool: SqlitePool,
}

impl VotingService {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    pub async fn add_candidate(
        &self,
        name: &str,
        party: &str,
        position: &str,
    ) -> Result<i64, ElectionError> {
        let name = non_empty(name, "name")?;
        let party = non_empty(party, "party")?;
        let position = non_empty(position, "position")?;

        let mut tx = self.pool.begin().await?;
        let index = candidates::add(&mut tx, name, party, position).await?;
        tx.commit().await?;

        info!("added candidate {} ({}) for {} at index {}", name, party, position, index);
        Ok(index)
    }

    pub async fn get_candidate(&self, index: i64) -> Result<Candidate, ElectionError> {
        let mut conn = self.pool.acquire().await?;
        candidates::get(&mut conn, index).await
    }

    pub async fn candidate_count(&self) -> Result<i64, ElectionError> {
        let mut conn = self.pool.acquire().await?;
        candidates::count(&mut conn).await
    }

    pub async fn candidates(&self) -> Result<Vec<Candidate>, ElectionError> {
        let mut conn = self.pool.acquire().await?;
        candidates::all(&mut conn).await
    }

    pub async fn register_voter(&self, voter_id: i64) -> Result<VoterRecord, ElectionError> {
        if voter_id <= 0 {
            return Err(ElectionError::InvalidVoterId(voter_id));
        }

        let mut tx = self.pool.begin().await?;
        let record = voters::register(&mut tx, voter_id).await?;
        tx.commit().await?;

        info!("registered voter {}", voter_id);
        Ok(record)
    }

    pub async fn is_registered(&self, voter_id: i64) -> Result<bool, ElectionError> {
        let mut conn = self.pool.acquire().await?;
        voters::is_registered(&mut conn, voter_id).await
    }

    pub async fn voter(&self, voter_id: i64) -> Result<Option<VoterRecord>, ElectionError> {
        let mut conn = self.pool.acquire().await?;
        voters::get(&mut conn, voter_id).await
    }

    /// Cast a vote. Preconditions are checked in order (registration, then
    /// candidate existence, then not-yet-voted for the candidate's position);
    /// on success the ballot entry and the tally increment commit together.
    pub async fn vote(&self, voter_id: i64, candidate_index: i64) -> Result<BallotEntry, ElectionError> {
        if voter_id <= 0 {
            return Err(ElectionError::InvalidVoterId(voter_id));
        }

        let mut tx = self.pool.begin().await?;

        if !voters::is_registered(&mut tx, voter_id).await? {
            return Err(ElectionError::NotRegistered { voter_id });
        }

        let candidate = candidates::get(&mut tx, candidate_index).await?;

        if ballots::has_voted(&mut tx, voter_id, &candidate.position).await? {
            return Err(ElectionError::AlreadyVoted {
                voter_id,
                position: candidate.position,
            });
        }

        let entry = ballots::record(&mut tx, voter_id, &candidate.position).await?;
        candidates::increment_vote(&mut tx, candidate_index).await?;
        tx.commit().await?;

        info!(
            "voter {} voted for candidate {} ({}), receipt {}",
            voter_id, candidate_index, entry.position, entry.receipt
        );
        Ok(entry)
    }

    pub async fn has_voted_for_position(
        &self,
        voter_id: i64,
        position: &str,
    ) -> Result<bool, ElectionError> {
        let mut conn = self.pool.acquire().await?;
        ballots::has_voted(&mut conn, voter_id, position).await
    }
}

fn non_empty<'a>(value: &'a str, field: &'static str) -> Result<&'a str, ElectionError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ElectionError::EmptyField { field });
    }
    Ok(trimmed)
}
