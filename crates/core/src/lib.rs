//! Domain logic for the video catalog.
//!
//! Nothing in this crate touches the database or the network. The repository
//! layer (`vidcat-db`) and the HTTP layer (`vidcat-api`) pass plain values in
//! and get decisions back.

pub mod catalog;
pub mod error;
pub mod ordering;
pub mod pagination;
pub mod slug;
pub mod topic_import;
pub mod types;
pub mod video;
pub mod visibility;
