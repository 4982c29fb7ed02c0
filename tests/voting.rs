use ballot_box::{Database, ElectionError, VotingService};

async fn service() -> VotingService {
    let db = Database::in_memory().await.expect("in-memory database");
    VotingService::new(&db)
}

#[tokio::test]
async fn adds_a_candidate() {
    let svc = service().await;

    let index = svc
        .add_candidate("Alice", "Party A", "President")
        .await
        .expect("candidate should be added");
    assert_eq!(index, 0);

    let candidate = svc.get_candidate(0).await.expect("candidate should exist");
    assert_eq!(candidate.index, 0);
    assert_eq!(candidate.name, "Alice");
    assert_eq!(candidate.party, "Party A");
    assert_eq!(candidate.position, "President");
    assert_eq!(candidate.vote_count, 0);
}

#[tokio::test]
async fn assigns_sequential_indexes() {
    let svc = service().await;

    assert_eq!(svc.add_candidate("Alice", "Party A", "President").await.unwrap(), 0);
    assert_eq!(svc.add_candidate("Bob", "Party B", "President").await.unwrap(), 1);
    assert_eq!(svc.add_candidate("Carol", "Party A", "Treasurer").await.unwrap(), 2);
    assert_eq!(svc.candidate_count().await.unwrap(), 3);
}

#[tokio::test]
async fn rejects_same_party_for_same_position() {
    let svc = service().await;
    svc.add_candidate("Alice", "Party A", "President").await.unwrap();

    // Name does not matter, (party, position) does
    let err = svc.add_candidate("Bob", "Party A", "President").await.unwrap_err();
    assert!(matches!(err, ElectionError::DuplicateCandidate { .. }));
    assert_eq!(svc.candidate_count().await.unwrap(), 1);
}

#[tokio::test]
async fn allows_same_party_for_different_position() {
    let svc = service().await;
    svc.add_candidate("Alice", "Party A", "President").await.unwrap();

    svc.add_candidate("Bob", "Party A", "Treasurer")
        .await
        .expect("same party may contest a different position");
    svc.add_candidate("Carol", "Party B", "President")
        .await
        .expect("a different party may contest the same position");
}

#[tokio::test]
async fn get_candidate_on_empty_registry_is_not_found() {
    let svc = service().await;

    let err = svc.get_candidate(0).await.unwrap_err();
    assert!(matches!(err, ElectionError::CandidateNotFound { index: 0 }));
}

#[tokio::test]
async fn rejects_empty_candidate_fields() {
    let svc = service().await;

    let err = svc.add_candidate("  ", "Party A", "President").await.unwrap_err();
    assert!(matches!(err, ElectionError::EmptyField { field: "name" }));
    let err = svc.add_candidate("Alice", "", "President").await.unwrap_err();
    assert!(matches!(err, ElectionError::EmptyField { field: "party" }));
    let err = svc.add_candidate("Alice", "Party A", "").await.unwrap_err();
    assert!(matches!(err, ElectionError::EmptyField { field: "position" }));
    assert_eq!(svc.candidate_count().await.unwrap(), 0);
}

#[tokio::test]
async fn registers_a_voter() {
    let svc = service().await;

    svc.register_voter(123).await.expect("voter should register");
    assert!(svc.is_registered(123).await.unwrap());
    assert!(svc.voter(123).await.unwrap().is_some());
}

#[tokio::test]
async fn rejects_double_registration() {
    let svc = service().await;
    svc.register_voter(123).await.unwrap();

    let err = svc.register_voter(123).await.unwrap_err();
    assert!(matches!(err, ElectionError::AlreadyRegistered { voter_id: 123 }));
    // Failed repeat leaves the registration in place
    assert!(svc.is_registered(123).await.unwrap());
}

#[tokio::test]
async fn rejects_non_positive_voter_ids() {
    let svc = service().await;

    let err = svc.register_voter(0).await.unwrap_err();
    assert!(matches!(err, ElectionError::InvalidVoterId(0)));
    let err = svc.register_voter(-5).await.unwrap_err();
    assert!(matches!(err, ElectionError::InvalidVoterId(-5)));
    let err = svc.vote(0, 0).await.unwrap_err();
    assert!(matches!(err, ElectionError::InvalidVoterId(0)));
}

#[tokio::test]
async fn unknown_voter_is_not_registered() {
    let svc = service().await;

    assert!(!svc.is_registered(999).await.unwrap());
    assert!(svc.voter(999).await.unwrap().is_none());
}

#[tokio::test]
async fn registered_voter_can_vote() {
    let svc = service().await;
    svc.register_voter(123).await.unwrap();
    svc.add_candidate("Alice", "Party A", "President").await.unwrap();

    let entry = svc.vote(123, 0).await.expect("vote should succeed");
    assert_eq!(entry.voter_id, 123);
    assert_eq!(entry.position, "President");

    let candidate = svc.get_candidate(0).await.unwrap();
    assert_eq!(candidate.vote_count, 1);
}

#[tokio::test]
async fn rejects_unregistered_voter() {
    let svc = service().await;
    svc.add_candidate("Alice", "Party A", "President").await.unwrap();

    let err = svc.vote(123, 0).await.unwrap_err();
    assert!(matches!(err, ElectionError::NotRegistered { voter_id: 123 }));

    let candidate = svc.get_candidate(0).await.unwrap();
    assert_eq!(candidate.vote_count, 0);
}

#[tokio::test]
async fn rejects_vote_for_missing_candidate() {
    let svc = service().await;
    svc.register_voter(123).await.unwrap();
    svc.add_candidate("Alice", "Party A", "President").await.unwrap();

    let err = svc.vote(123, 7).await.unwrap_err();
    assert!(matches!(err, ElectionError::CandidateNotFound { index: 7 }));
    // The failed vote must not mark the position as voted
    assert!(!svc.has_voted_for_position(123, "President").await.unwrap());
}

#[tokio::test]
async fn rejects_second_vote_for_same_position() {
    let svc = service().await;
    svc.register_voter(123).await.unwrap();
    svc.add_candidate("Alice", "Party A", "President").await.unwrap();

    svc.vote(123, 0).await.unwrap();
    let err = svc.vote(123, 0).await.unwrap_err();
    assert!(matches!(err, ElectionError::AlreadyVoted { .. }));

    let candidate = svc.get_candidate(0).await.unwrap();
    assert_eq!(candidate.vote_count, 1);
}

#[tokio::test]
async fn one_vote_per_position_across_candidates() {
    let svc = service().await;
    svc.register_voter(123).await.unwrap();
    svc.add_candidate("Alice", "Party A", "President").await.unwrap();
    svc.add_candidate("Bob", "Party B", "President").await.unwrap();

    svc.vote(123, 0).await.unwrap();
    // Voting for a different candidate contesting the same position is still
    // a second vote for that position
    let err = svc.vote(123, 1).await.unwrap_err();
    assert!(matches!(err, ElectionError::AlreadyVoted { .. }));

    assert_eq!(svc.get_candidate(0).await.unwrap().vote_count, 1);
    assert_eq!(svc.get_candidate(1).await.unwrap().vote_count, 0);
}

#[tokio::test]
async fn voter_may_vote_once_per_position() {
    let svc = service().await;
    svc.register_voter(123).await.unwrap();
    svc.add_candidate("Alice", "Party A", "President").await.unwrap();
    svc.add_candidate("Bob", "Party A", "Treasurer").await.unwrap();

    svc.vote(123, 0).await.unwrap();
    svc.vote(123, 1).await.expect("a different position is a fresh ballot");

    assert!(svc.has_voted_for_position(123, "President").await.unwrap());
    assert!(svc.has_voted_for_position(123, "Treasurer").await.unwrap());
}

#[tokio::test]
async fn checks_if_voter_has_voted_for_position() {
    let svc = service().await;
    svc.register_voter(123).await.unwrap();
    svc.add_candidate("Alice", "Party A", "President").await.unwrap();

    assert!(!svc.has_voted_for_position(123, "President").await.unwrap());
    svc.vote(123, 0).await.unwrap();
    assert!(svc.has_voted_for_position(123, "President").await.unwrap());
}

#[tokio::test]
async fn tallies_votes_from_distinct_voters() {
    let svc = service().await;
    svc.add_candidate("Alice", "Party A", "President").await.unwrap();
    svc.register_voter(1).await.unwrap();
    svc.register_voter(2).await.unwrap();
    svc.register_voter(3).await.unwrap();

    svc.vote(1, 0).await.unwrap();
    svc.vote(2, 0).await.unwrap();
    svc.vote(3, 0).await.unwrap();

    assert_eq!(svc.get_candidate(0).await.unwrap().vote_count, 3);
}

#[tokio::test]
async fn racing_votes_for_same_position_admit_one_winner() {
    let svc = service().await;
    svc.register_voter(123).await.unwrap();
    svc.add_candidate("Alice", "Party A", "President").await.unwrap();
    svc.add_candidate("Bob", "Party B", "President").await.unwrap();

    let a = {
        let svc = svc.clone();
        tokio::spawn(async move { svc.vote(123, 0).await })
    };
    let b = {
        let svc = svc.clone();
        tokio::spawn(async move { svc.vote(123, 1).await })
    };
    let ra = a.await.unwrap();
    let rb = b.await.unwrap();

    assert_eq!(
        ra.is_ok() as u32 + rb.is_ok() as u32,
        1,
        "exactly one of two racing votes may succeed"
    );

    let total = svc.get_candidate(0).await.unwrap().vote_count
        + svc.get_candidate(1).await.unwrap().vote_count;
    assert_eq!(total, 1);
}

#[tokio::test]
async fn racing_duplicate_candidates_admit_one_winner() {
    let svc = service().await;

    let a = {
        let svc = svc.clone();
        tokio::spawn(async move { svc.add_candidate("Alice", "Party A", "President").await })
    };
    let b = {
        let svc = svc.clone();
        tokio::spawn(async move { svc.add_candidate("Bob", "Party A", "President").await })
    };
    let ra = a.await.unwrap();
    let rb = b.await.unwrap();

    assert_eq!(ra.is_ok() as u32 + rb.is_ok() as u32, 1);
    assert_eq!(svc.candidate_count().await.unwrap(), 1);
}

#[tokio::test]
async fn racing_duplicate_registrations_admit_one_winner() {
    let svc = service().await;

    let a = {
        let svc = svc.clone();
        tokio::spawn(async move { svc.register_voter(123).await })
    };
    let b = {
        let svc = svc.clone();
        tokio::spawn(async move { svc.register_voter(123).await })
    };
    let ra = a.await.unwrap();
    let rb = b.await.unwrap();

    assert_eq!(ra.is_ok() as u32 + rb.is_ok() as u32, 1);
    assert!(svc.is_registered(123).await.unwrap());
}
