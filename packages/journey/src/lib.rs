// Journey Pipeline - Core
//
// This crate turns a submitted external URL into a journey owned by the user's
// wallet: extract the page, create the journey, then initialize it.
// Collaborators sit behind Base* traits in kernel/; sequencing lives in
// domains/journeys/.

pub mod config;
pub mod domains;
pub mod kernel;

pub use config::*;
