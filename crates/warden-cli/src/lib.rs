//! # Warden CLI
//!
//! Administrative tasks that do not belong behind the HTTP API.
//!
//! - [`seeder`]: fixture and fake users with API keys
//! - [`federation`]: importing a federated profile and issuing its bearer token

pub mod federation;
pub mod seeder;
