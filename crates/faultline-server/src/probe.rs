//! Routes that raise one error of each category
//!
//! Used to exercise the translation end to end against a running host.

use std::borrow::Cow;
use std::time::Duration;

use axum::Router;
use axum::extract::Path;
use axum::routing::{get, post};
use faultline_core::extract::Valid;
use faultline_core::{ApiError, CommitFlag, DomainError, UpstreamFailure};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Semaphore;
use validator::{Validate, ValidationError};

/// Body length of the simulated upstream failure, past the default echo limit
const UPSTREAM_BODY_LEN: usize = 12_000;

pub fn router() -> Router {
    Router::new()
        .route("/probe/orders", post(create_order))
        .route("/probe/orders/{id}", get(get_order).delete(delete_order))
        .route("/probe/timeout", get(timeout))
        .route("/probe/timeout/committed", get(committed_timeout))
        .route("/probe/rejected", get(rejected))
        .route("/probe/undeclared", get(undeclared))
        .route("/probe/upstream", get(upstream))
        .route("/probe/forbidden", get(forbidden))
        .route("/probe/unclassified", get(unclassified))
}

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "consistent_total", skip_on_field_errors = false))]
struct NewOrder {
    #[validate(custom(function = "not_blank"))]
    sku: String,
    #[validate(range(min = 1, code = "Min", message = "must be greater than or equal to 1"))]
    quantity: i64,
    #[serde(default)]
    total: Option<i64>,
}

#[derive(Debug, Serialize)]
struct Order {
    id: u64,
    sku: String,
    quantity: i64,
}

fn rule(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(rule("NotBlank", "must not be blank"));
    }
    Ok(())
}

fn consistent_total(order: &NewOrder) -> Result<(), ValidationError> {
    if order.total.is_some_and(|total| total < 0) {
        return Err(rule("ConsistentTotal", "total must not be negative"));
    }
    Ok(())
}

async fn create_order(Valid(order): Valid<NewOrder>) -> (StatusCode, axum::Json<Order>) {
    (
        StatusCode::CREATED,
        axum::Json(Order {
            id: 1,
            sku: order.sku,
            quantity: order.quantity,
        }),
    )
}

#[derive(Debug, Error)]
#[error("order {0} not found")]
struct OrderNotFound(u64);

impl DomainError for OrderNotFound {
    fn declared_status(&self) -> Option<StatusCode> {
        Some(StatusCode::NOT_FOUND)
    }

    fn code(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed("ORDER_NOT_FOUND"))
    }
}

#[derive(Debug, Error)]
#[error("order {0} already removed")]
struct AlreadyRemoved(u64);

impl DomainError for AlreadyRemoved {
    fn declared_status(&self) -> Option<StatusCode> {
        Some(StatusCode::NO_CONTENT)
    }
}

#[derive(Debug, Error)]
#[error("inventory is being rebuilt")]
struct InventoryRebuilding;

impl DomainError for InventoryRebuilding {}

async fn get_order(Path(id): Path<u64>) -> Result<axum::Json<Order>, ApiError> {
    Err(ApiError::domain(OrderNotFound(id)))
}

async fn delete_order(Path(id): Path<u64>) -> Result<StatusCode, ApiError> {
    Err(ApiError::domain(AlreadyRemoved(id)))
}

async fn undeclared() -> Result<(), ApiError> {
    Err(ApiError::domain(InventoryRebuilding))
}

async fn timeout() -> Result<(), ApiError> {
    tokio::time::timeout(Duration::from_millis(5), std::future::pending::<()>()).await?;
    Ok(())
}

async fn committed_timeout(flag: CommitFlag) -> Result<(), ApiError> {
    flag.commit();
    tokio::time::timeout(Duration::from_millis(5), std::future::pending::<()>()).await?;
    Ok(())
}

async fn rejected() -> Result<(), ApiError> {
    let workers = Semaphore::new(0);
    let _permit = workers.try_acquire()?;
    Ok(())
}

async fn upstream() -> Result<(), ApiError> {
    let body = "e".repeat(UPSTREAM_BODY_LEN);
    Err(UpstreamFailure::new("502 Bad Gateway", body).into())
}

async fn forbidden() -> Result<(), ApiError> {
    Err(ApiError::access_denied("missing role: admin"))
}

async fn unclassified() -> Result<(), ApiError> {
    Err(ApiError::other(std::io::Error::other("disk quota exceeded")))
}
