pub mod delta;
pub mod list;
pub mod log;
pub mod normalize;
pub mod reconcile;
pub mod sync;
