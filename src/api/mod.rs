pub mod client;
pub mod error;
pub mod range;
pub mod records;
