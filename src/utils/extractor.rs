//! 安全的路径参数提取器
//!
//! 解析失败时直接返回 400 及统一响应体，处理函数中无需再校验。

use actix_web::{
    FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError,
};
use futures_util::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

/// 路径中的 `{id}` 参数，保证为正整数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeIDI64(pub i64);

fn parse_positive_id(raw: Option<&str>, name: &str) -> Result<i64, String> {
    let raw = raw.ok_or_else(|| format!("Missing path parameter: {name}"))?;
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(format!("Invalid {name}: '{raw}'")),
    }
}

fn bad_request(message: String) -> actix_web::Error {
    let response =
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, &message));
    InternalError::from_response(message, response).into()
}

impl FromRequest for SafeIDI64 {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            parse_positive_id(req.match_info().get("id"), "id")
                .map(SafeIDI64)
                .map_err(bad_request),
        )
    }
}
