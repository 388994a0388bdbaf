//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_membership_repository;
mod postgres_membership_repository;

pub use in_memory_membership_repository::InMemoryMembershipRepository;
pub use postgres_membership_repository::PostgresMembershipRepository;
