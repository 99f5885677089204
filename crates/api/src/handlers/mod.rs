pub mod playlist;
pub mod public;
pub mod topic;
pub mod video;
