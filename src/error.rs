use crate::api::error::ApiError;
use crate::merge::error::MergeError;
use crate::table_io::error::TableIoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AqiError {
    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    TableIo(#[from] TableIoError),

    #[error(transparent)]
    Api(#[from] ApiError),
}
