pub mod collaborator_repo;

pub use collaborator_repo::*;
