// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
};
use std::time::Duration;
use streak_tracker::error::{AppError, StoreError, StreakError};

#[test]
fn test_streak_errors_are_recoverable() {
    let err = StreakError::TransientRead(StoreError::Offline);
    assert!(err.is_recoverable());
    assert_eq!(err.store_error(), &StoreError::Offline);

    let err = StreakError::Reconciliation(StoreError::Timeout(Duration::from_millis(50)));
    assert!(err.is_recoverable());
    assert_eq!(
        err.store_error(),
        &StoreError::Timeout(Duration::from_millis(50))
    );
}

#[test]
fn test_streak_error_maps_to_service_unavailable() {
    let err: AppError = StreakError::TransientRead(StoreError::Unavailable("down".into())).into();
    let response = err.into_response();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "5");
}

#[test]
fn test_store_error_maps_to_internal_error() {
    let err: AppError = StoreError::Timeout(Duration::from_secs(2)).into();
    let response = err.into_response();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.headers().get(header::RETRY_AFTER).is_none());
}

#[test]
fn test_client_errors() {
    assert_eq!(
        AppError::BadRequest("nope".into()).into_response().status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        AppError::Unauthorized.into_response().status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        AppError::NotFound("user".into()).into_response().status(),
        StatusCode::NOT_FOUND
    );
}
