pub mod puzzle;
pub mod raw;
pub mod session;
pub mod summary;
