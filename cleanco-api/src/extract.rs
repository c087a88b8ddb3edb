use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// `Json` body whose rejections render as `{"message": ...}`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Query string extractor. Repeated keys collect into `Vec` fields instead of
/// failing, and rejections render as `{"message": ...}`.
#[derive(FromRequestParts)]
#[from_request(via(axum_extra::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);
