//! Repositories over the document store

pub mod activity;
pub mod user;

pub use activity::ActivityRepository;
pub use user::UserRepository;
