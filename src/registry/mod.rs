// The three registries behind VotingService. Every function takes a plain
// connection so the service can run a whole operation inside one transaction.

pub mod ballots;
pub mod candidates;
pub mod voters;
