//! Domain layer - Core design rules and entities

pub mod error;
pub mod experiment;

pub use error::DomainError;
