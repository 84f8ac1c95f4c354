pub mod error;
pub mod table_merger;
