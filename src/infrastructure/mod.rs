//! Infrastructure layer - Calculators and collaborator implementations

pub mod experiment;
pub mod logging;
