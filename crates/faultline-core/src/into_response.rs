use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use http::StatusCode;

use crate::failure::ApiError;

/// Error parked on a provisional response until it is translated
#[derive(Debug, Clone)]
pub struct PendingFailure(Arc<ApiError>);

impl PendingFailure {
    pub fn error(&self) -> &ApiError {
        &self.0
    }
}

impl IntoResponse for ApiError {
    /// Bare 500 carrying the error in its extensions
    ///
    /// The translation middleware swaps it for the translated response. When
    /// the middleware is not installed the bare status goes out as-is.
    fn into_response(self) -> Response {
        let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        response.extensions_mut().insert(PendingFailure(Arc::new(self)));
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::Category;

    #[test]
    fn provisional_response_carries_error() {
        let response = ApiError::async_timeout().into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let pending = response.extensions().get::<PendingFailure>().unwrap();
        assert_eq!(pending.error().category(), Category::AsyncTimeout);
    }
}
