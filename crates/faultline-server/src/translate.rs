use std::any::Any;
use std::sync::Arc;

use axum::Router;
use axum::extract::{OriginalUri, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use faultline_core::{ApiError, CommitFlag, PendingFailure, RequestContext};
use faultline_translator::{ErrorTranslator, Translation};
use thiserror::Error;
use tower_http::catch_panic::CatchPanicLayer;

/// A route handler panicked while serving the request
#[derive(Debug, Error)]
#[error("handler panicked: {0}")]
pub struct HandlerPanicked(pub String);

/// Install the translation middleware on `router`
///
/// Every route already added to the router gets its [`ApiError`]s
/// translated into JSON error bodies. Handler panics are caught and reported
/// as a [`HandlerPanicked`] error through the same translation.
pub fn with_error_translation<S>(router: Router<S>, translator: Arc<ErrorTranslator>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    // The panic layer must sit inside the middleware so its response is translated
    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(axum::middleware::from_fn_with_state(translator, translate_errors))
}

/// Provisional response for a panicked handler
fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_owned());

    ApiError::other(HandlerPanicked(message)).into_response()
}

/// Middleware that swaps provisional error responses for translated ones
///
/// Hands each request a [`CommitFlag`] and records its URI. Responses
/// without a pending failure pass through untouched.
pub async fn translate_errors(
    State(translator): State<Arc<ErrorTranslator>>,
    mut request: Request,
    next: Next,
) -> Response {
    // Nested routers see a stripped URI; report the one the caller sent
    let uri = request
        .extensions()
        .get::<OriginalUri>()
        .map_or_else(|| request.uri().clone(), |original| original.0.clone());

    let flag = CommitFlag::new();
    request.extensions_mut().insert(flag.clone());

    let mut response = next.run(request).await;

    let Some(pending) = response.extensions_mut().remove::<PendingFailure>() else {
        return response;
    };

    let ctx = RequestContext::for_uri(uri).with_commit_flag(flag);
    render(translator.translate(pending.error(), &ctx), response)
}

/// Turn a translation into the response sent to the caller
///
/// `provisional` is returned unchanged when the response was already
/// committed. axum writes nothing to the connection before the handler's
/// response reaches this layer, so a committed failure cannot leave earlier
/// output in place: the caller receives the provisional response itself,
/// which is the bare status the failure's `IntoResponse` produced (500 for
/// every category) with an empty body.
pub fn render(translation: Translation, provisional: Response) -> Response {
    match translation {
        Translation::Respond {
            status,
            body: Some(body),
        } => (status, axum::Json(body)).into_response(),
        Translation::Respond { status, body: None } => status.into_response(),
        Translation::AlreadyCommitted => {
            tracing::debug!("response already committed, leaving it untouched");
            provisional
        }
    }
}
