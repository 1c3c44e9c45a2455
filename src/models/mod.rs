pub mod period;
pub mod summary;
pub mod transaction;
