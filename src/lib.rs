pub mod db;
pub mod error;
pub mod models;
pub mod registry;
pub mod service;

pub use db::Database;
pub use error::ElectionError;
pub use service::VotingService;
