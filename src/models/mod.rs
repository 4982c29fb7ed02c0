use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An entrant for a position. Indexes are 0-based ordinals assigned at
/// insertion and never reused; `vote_count` only moves up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub index: i64,
    pub name: String,
    pub party: String,
    pub position: String,
    pub vote_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoterRecord {
    pub voter_id: i64,
    pub registered_at: DateTime<Utc>,
}

/// The record that a voter has voted for a position. The receipt is handed
/// back to the caller on a successful vote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BallotEntry {
    pub voter_id: i64,
    pub position: String,
    pub receipt: Uuid,
    pub cast_at: DateTime<Utc>,
}
