//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. The position and slug repositories
//! are building blocks and take `&mut PgConnection` instead, so the catalog
//! repositories can run them inside their own transactions.

pub mod playlist_repo;
pub mod position_repo;
pub mod slug_repo;
pub mod topic_repo;
pub mod video_repo;

pub use playlist_repo::PlaylistRepo;
pub use position_repo::PositionRepo;
pub use slug_repo::{SlugRepo, SlugScope};
pub use topic_repo::TopicRepo;
pub use video_repo::VideoRepo;
