pub mod column;
pub mod record;
pub mod row_set;
