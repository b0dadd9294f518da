use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use formpilot_core::FormPilotError;
use serde::de::DeserializeOwned;
use serde_json::json;

/// Wraps `FormPilotError` so handlers can return it directly as an Axum
/// response; the status code comes straight from `FormPilotError::status_code`.
pub struct ApiError(pub FormPilotError);

impl From<FormPilotError> for ApiError {
    fn from(err: FormPilotError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(json!({"error": self.0.to_string(), "code": self.0.code()}));
        (status, body).into_response()
    }
}

/// Drop-in replacement for `axum::Json` that turns a malformed or
/// undeserializable body into a 422 instead of axum's default 400/415.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(FormPilotError::InvalidBody(describe(rejection)).into()),
        }
    }
}

fn describe(rejection: JsonRejection) -> String {
    rejection.body_text()
}
