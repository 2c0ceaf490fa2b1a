use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;

use crate::operations::OperationError;

/// Error envelope shared by every endpoint.
#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ErrorBody {
    err: String,
}

impl ResponseError for OperationError {
    fn status_code(&self) -> StatusCode {
        match self {
            OperationError::Validation(_) => StatusCode::BAD_REQUEST,
            OperationError::DuplicateKey(_) => StatusCode::BAD_REQUEST,
            OperationError::NotFound(_) => StatusCode::NOT_FOUND,
            OperationError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            err: self.to_string(),
        })
    }
}

/// Runs `operation` and writes its outcome: the value as JSON with a 200, or the error envelope
/// with the status of the error.
pub async fn return_json<T, F>(operation: F) -> HttpResponse
where
    T: Serialize,
    F: Future<Output = Result<T, OperationError>>,
{
    match operation.await {
        Ok(data) => HttpResponse::Ok().json(data),
        Err(err) => {
            if err.status_code().is_server_error() {
                tracing::error!("Request failed: {:?}", err);
            } else {
                tracing::warn!("Request rejected: {:?}", err);
            }
            err.error_response()
        }
    }
}

/// Parameters come from the JSON body, or from the query string when the body is empty.
pub fn decode_request<T: DeserializeOwned>(
    req: &HttpRequest,
    body: &web::Bytes,
) -> Result<T, OperationError> {
    if body.is_empty() {
        return web::Query::<T>::from_query(req.query_string())
            .map(web::Query::into_inner)
            .map_err(|err| OperationError::Validation(format!("Invalid query string: {}", err)));
    }

    serde_json::from_slice(body)
        .map_err(|err| OperationError::Validation(format!("Invalid JSON body: {}", err)))
}
