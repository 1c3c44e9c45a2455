pub mod add;
pub mod browse;
pub mod export;
pub mod import;
pub mod report;
pub mod summary;
