use axum::{http::StatusCode, response::IntoResponse};
use eyre::Report;
use uuid::Uuid;
use zkauth_core::AddressError;

pub type ApiResult<T> = Result<T, ApiErrors>;

#[derive(Debug, thiserror::Error)]
pub enum ApiErrors {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("Cannot find resource: \"{0}\"")]
    NotFound(String),
    #[error(transparent)]
    InternalSeverError(#[from] eyre::Report),
}

impl From<AddressError> for ApiErrors {
    fn from(value: AddressError) -> Self {
        tracing::debug!("{value:?}");
        ApiErrors::BadRequest(value.to_string())
    }
}

impl IntoResponse for ApiErrors {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiErrors::BadRequest(reason) => (StatusCode::BAD_REQUEST, reason).into_response(),
            ApiErrors::NotFound(message) => (StatusCode::NOT_FOUND, message).into_response(),
            ApiErrors::InternalSeverError(inner) => {
                handle_internal_server_error(inner).into_response()
            }
        }
    }
}

fn handle_internal_server_error(err: Report) -> (StatusCode, String) {
    let error_id = Uuid::new_v4();
    tracing::error!("{error_id} - {err:?}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("An internal server error has occurred. Error ID={error_id}"),
    )
}
