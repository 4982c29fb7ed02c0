use ballot_box::models::Candidate;
use ballot_box::{Database, VotingService};
use log::{error, info};
use std::collections::BTreeMap;
use std::io::Write as _;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() {
    // Initialize logging
    dotenvy::dotenv().ok();
    env_logger::init();

    // Initialize database
    let database = match Database::new().await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return;
        }
    };

    let service = VotingService::new(&database);
    info!("ballot box ready");

    if let Err(e) = run_portal(service).await {
        error!("Portal error: {}", e);
    }
}

async fn run_portal(service: VotingService) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    // Active voter for `vote`, set after a registration check
    let mut active_voter: Option<i64> = None;

    print_help();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let args = tokenize(&line);
        let Some(command) = args.first() else {
            continue;
        };

        match command.as_str() {
            "help" => print_help(),
            "quit" | "exit" => break,

            "candidates" => match service.candidates().await {
                Ok(list) => print_candidate_table(&list),
                Err(e) => println!("Error: {}", e),
            },

            "candidate" => match args.get(1).and_then(|s| s.parse::<i64>().ok()) {
                Some(index) => match service.get_candidate(index).await {
                    Ok(c) => println!(
                        "[{}] {} ({}) running for {}, {} vote(s)",
                        c.index, c.name, c.party, c.position, c.vote_count
                    ),
                    Err(e) => println!("Error: {}", e),
                },
                None => println!("usage: candidate <index>"),
            },

            "add-candidate" => match (args.get(1), args.get(2), args.get(3)) {
                (Some(name), Some(party), Some(position)) => {
                    match service.add_candidate(name, party, position).await {
                        Ok(index) => println!("Candidate {} added at index {}.", name, index),
                        Err(e) => println!("Error: {}", e),
                    }
                }
                _ => println!("usage: add-candidate <name> <party> <position>"),
            },

            "register" => match args.get(1).and_then(|s| s.parse::<i64>().ok()) {
                Some(voter_id) => match service.register_voter(voter_id).await {
                    Ok(record) => {
                        println!("Voter ID {} registered successfully.", record.voter_id)
                    }
                    Err(e) => println!("Error: {}", e),
                },
                None => println!("usage: register <voter-id>"),
            },

            "voter" => match args.get(1).and_then(|s| s.parse::<i64>().ok()) {
                Some(voter_id) => match service.voter(voter_id).await {
                    Ok(Some(record)) => println!(
                        "Voter {} registered at {}.",
                        record.voter_id,
                        record.registered_at.to_rfc3339()
                    ),
                    Ok(None) => println!("Voter {} is not registered.", voter_id),
                    Err(e) => println!("Error: {}", e),
                },
                None => println!("usage: voter <voter-id>"),
            },

            "set-voter" => match args.get(1).and_then(|s| s.parse::<i64>().ok()) {
                Some(voter_id) => match service.is_registered(voter_id).await {
                    Ok(true) => {
                        active_voter = Some(voter_id);
                        println!("Voter ID set to {}. You can now cast a vote.", voter_id);
                    }
                    Ok(false) => {
                        active_voter = None;
                        println!("This Voter ID is not registered.");
                    }
                    Err(e) => println!("Error: {}", e),
                },
                None => println!("usage: set-voter <voter-id>"),
            },

            "vote" => {
                let Some(voter_id) = active_voter else {
                    println!("Please set your Voter ID first!");
                    continue;
                };
                match args.get(1).and_then(|s| s.parse::<i64>().ok()) {
                    Some(index) => match service.vote(voter_id, index).await {
                        Ok(entry) => println!(
                            "Your vote for candidate {} was recorded. Receipt: {}",
                            index, entry.receipt
                        ),
                        Err(e) => println!("Error: {}", e),
                    },
                    None => println!("usage: vote <candidate-index>"),
                }
            }

            "has-voted" => match (args.get(1).and_then(|s| s.parse::<i64>().ok()), args.get(2)) {
                (Some(voter_id), Some(position)) => {
                    match service.has_voted_for_position(voter_id, position).await {
                        Ok(true) => println!("Voter {} has voted for {}.", voter_id, position),
                        Ok(false) => {
                            println!("Voter {} has not voted for {}.", voter_id, position)
                        }
                        Err(e) => println!("Error: {}", e),
                    }
                }
                _ => println!("usage: has-voted <voter-id> <position>"),
            },

            "export" => match service.candidates().await {
                Ok(list) => match serde_json::to_string_pretty(&list) {
                    Ok(json) => println!("{}", json),
                    Err(e) => println!("Error: {}", e),
                },
                Err(e) => println!("Error: {}", e),
            },

            other => println!("Unknown command: {} (try help)", other),
        }
    }

    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  candidates                              list candidates grouped by party");
    println!("  candidate <index>                       show one candidate");
    println!("  add-candidate <name> <party> <position> add a candidate (quote multi-word values)");
    println!("  register <voter-id>                     register a voter");
    println!("  voter <voter-id>                        show a voter's registration");
    println!("  set-voter <voter-id>                    choose the voter that will cast votes");
    println!("  vote <candidate-index>                  cast a vote as the active voter");
    println!("  has-voted <voter-id> <position>         check a voter's ballot for a position");
    println!("  export                                  dump candidates as JSON");
    println!("  quit");
}

fn print_candidate_table(list: &[Candidate]) {
    if list.is_empty() {
        println!("No candidates yet.");
        return;
    }

    let mut by_party: BTreeMap<&str, Vec<&Candidate>> = BTreeMap::new();
    for candidate in list {
        by_party.entry(candidate.party.as_str()).or_default().push(candidate);
    }

    for (party, candidates) in by_party {
        println!("Party: {}", party);
        for c in candidates {
            println!("  [{}] {} - {} ({} vote(s))", c.index, c.name, c.position, c.vote_count);
        }
    }
}

// Whitespace split with double-quote grouping, so multi-word names and
// positions survive ("Party A", "Vice President").
fn tokenize(line: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        args.push(current);
    }
    args
}
