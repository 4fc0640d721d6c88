#[cfg(test)]
pub mod memory;
pub mod repo;
pub mod repo_types;

pub use repo::{MySqlUserStore, StoreError, UserStore};
pub use repo_types::PublicUser;
