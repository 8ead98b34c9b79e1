//! axum extractors whose rejections are [`ApiError`]s

use std::convert::Infallible;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Request};
use http::request::Parts;
use serde::de::DeserializeOwned;

use crate::context::CommitFlag;
#[cfg(feature = "validator")]
use crate::failure::ValidationFailure;
use crate::failure::{ApiError, MalformedBody};

/// JSON body extractor that rejects with a malformed-body [`ApiError`]
///
/// Drop-in replacement for [`axum::Json`] on the request side, so unreadable
/// payloads flow through translation instead of axum's plain-text rejection.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(request, state).await?;
        Ok(Self(value))
    }
}

/// JSON body extractor that also runs the payload's `validator` rules
///
/// Unreadable payloads reject like [`Json`]; rule violations reject with a
/// [`ValidationFailure`] named after `T`.
#[cfg(feature = "validator")]
#[derive(Debug, Clone, Copy, Default)]
pub struct Valid<T>(pub T);

#[cfg(feature = "validator")]
impl<T, S> FromRequest<S> for Valid<T>
where
    T: DeserializeOwned + validator::Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(request, state).await?;
        value
            .validate()
            .map_err(|errors| ValidationFailure::for_type::<T>(&errors))?;
        Ok(Self(value))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = rejection.status();
        Self::from(MalformedBody::new(rejection.body_text())).with_status(status)
    }
}

/// Hands the request's commit flag to handlers
///
/// Outside the translation middleware a fresh, unshared flag is returned.
impl<S: Send + Sync> FromRequestParts<S> for CommitFlag {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Self>().cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::body::Body;
    use axum::routing::post;
    use http::StatusCode;
    use serde::Deserialize;
    use tower::ServiceExt;

    use super::*;
    use crate::failure::{Category, ErrorKind};
    use crate::into_response::PendingFailure;

    #[derive(Debug, Deserialize)]
    struct Order {
        #[allow(dead_code)]
        sku: String,
    }

    async fn create(Json(_order): Json<Order>) -> StatusCode {
        StatusCode::CREATED
    }

    fn request(content_type: &str, body: &'static str) -> Request {
        http::Request::post("/orders")
            .header(http::header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn valid_body_reaches_handler() {
        let app = Router::new().route("/orders", post(create));
        let response = app.oneshot(request("application/json", r#"{"sku":"A1"}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn truncated_body_becomes_malformed_body_error() {
        let app = Router::new().route("/orders", post(create));
        let response = app.oneshot(request("application/json", r#"{"sku":"#)).await.unwrap();

        let pending = response.extensions().get::<PendingFailure>().unwrap();
        assert_eq!(pending.error().category(), Category::MalformedBody);
        assert!(pending.error().message().is_some());
    }

    #[tokio::test]
    async fn wrong_content_type_keeps_rejection_status() {
        let app = Router::new().route("/orders", post(create));
        let response = app.oneshot(request("text/plain", "{}")).await.unwrap();

        let pending = response.extensions().get::<PendingFailure>().unwrap();
        let ErrorKind::MalformedBody(body) = pending.error().kind() else {
            panic!("expected malformed body");
        };
        assert_eq!(body.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[cfg(feature = "validator")]
    mod valid {
        use validator::Validate;

        use super::*;

        #[derive(Debug, Deserialize, Validate)]
        struct Restock {
            #[validate(range(min = 1, code = "Min", message = "must be greater than or equal to 1"))]
            quantity: i64,
        }

        async fn restock(Valid(restock): Valid<Restock>) -> String {
            restock.quantity.to_string()
        }

        #[tokio::test]
        async fn passing_rules_reach_handler() {
            let app = Router::new().route("/orders", post(restock));
            let response = app.oneshot(request("application/json", r#"{"quantity":4}"#)).await.unwrap();

            assert_eq!(response.status(), StatusCode::OK);
        }

        #[tokio::test]
        async fn broken_rule_becomes_validation_failure() {
            let app = Router::new().route("/orders", post(restock));
            let response = app.oneshot(request("application/json", r#"{"quantity":0}"#)).await.unwrap();

            let pending = response.extensions().get::<PendingFailure>().unwrap();
            let ErrorKind::Validation(failure) = pending.error().kind() else {
                panic!("expected validation failure");
            };
            assert_eq!(failure.errors().len(), 1);
            assert_eq!(failure.errors()[0].object_name, "restock");
            assert_eq!(failure.errors()[0].field.as_deref(), Some("quantity"));
            assert_eq!(failure.errors()[0].code, "Min");
        }

        #[tokio::test]
        async fn unreadable_body_is_still_malformed() {
            let app = Router::new().route("/orders", post(restock));
            let response = app.oneshot(request("application/json", r#"{"quantity":"#)).await.unwrap();

            let pending = response.extensions().get::<PendingFailure>().unwrap();
            assert_eq!(pending.error().category(), Category::MalformedBody);
        }
    }
}
