use thiserror::Error;

use crate::api::ApiError;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("minutes {0} has no transcript yet")]
    NotTranscripted(i64),

    #[error("result for minutes {0} contained no transcript")]
    EmptyTranscript(i64),

    #[error("no chat session is active for minutes {0}")]
    NoSession(i64),

    #[error("message is empty")]
    EmptyMessage,

    #[error("minutes {0} is no longer on view")]
    Superseded(i64),
}
