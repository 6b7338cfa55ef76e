pub mod collaborator;

pub use collaborator::*;
