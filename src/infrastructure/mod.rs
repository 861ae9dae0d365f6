//! Infrastructure layer - Storage backends, credential digests and services

pub mod follow;
pub mod logging;
pub mod storage;
pub mod user;
