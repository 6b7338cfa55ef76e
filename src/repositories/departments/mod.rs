pub mod department_repo;

pub use department_repo::*;
