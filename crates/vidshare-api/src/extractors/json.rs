//! JSON body extractor with field validation.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

use vidshare_core::error::AppError;

use crate::error::HttpAppError;

/// Deserializes a JSON body and runs its `validator` rules.
///
/// Both malformed bodies and rule violations become a 400 with the standard
/// error shape.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            AppError::validation(format!("Invalid request body: {}", rejection.body_text()))
        })?;

        inner
            .validate()
            .map_err(|e| AppError::validation(format!("Validation failed: {e}")))?;

        Ok(ValidatedJson(inner))
    }
}
