//! Generic `/api/*` passthrough to the backend.
//!
//! Anything under `/api/` without a dedicated handler is forwarded to the same
//! path beneath the backend base URL, with the shopper's bearer token attached.
//! Query keys are translated to camelCase; multipart uploads are re-encoded
//! field by field. Successful responses stream straight back, failures are
//! turned into the failure envelope.

use axum::{
    body::Body,
    extract::{FromRequest, Multipart, Request, State},
    http::{
        HeaderMap, Method, StatusCode,
        header::{CACHE_CONTROL, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use reqwest::multipart::{Form, Part};
use tracing::instrument;

use crate::backend::query::translate_query;
use crate::backend::{CachedResponse, Envelope, error_message, is_cacheable_path};
use crate::error::{AppError, Result};
use crate::middleware::{OptionalBackendToken, REQUEST_ID_HEADER};
use crate::state::AppState;

const API_PREFIX: &str = "/api/";

/// Request headers copied onto the backend request.
const FORWARDED_HEADERS: &[&str] = &["accept", "accept-language", REQUEST_ID_HEADER];

/// Forward a request to the backend.
#[instrument(skip_all, fields(method = %request.method(), path = %request.uri().path()))]
pub async fn forward(
    State(state): State<AppState>,
    OptionalBackendToken(token): OptionalBackendToken,
    request: Request,
) -> Result<Response> {
    let Some(path) = request.uri().path().strip_prefix(API_PREFIX) else {
        return Err(AppError::NotFound("Not found".to_string()));
    };
    let path = path.to_string();
    let query = translate_query(request.uri().query());

    let backend = state.backend();
    let url = backend.endpoint(&path, &query)?;
    let method = request.method().clone();

    let mut forwarded = HeaderMap::new();
    for name in FORWARDED_HEADERS {
        if let Some(value) = request.headers().get(*name) {
            forwarded.insert(*name, value.clone());
        }
    }

    if method == Method::GET
        && token.is_none()
        && backend.caching_enabled()
        && is_cacheable_path(&path)
    {
        let cached = backend.fetch_cached(url, forwarded).await?;
        return Ok(cached_response(cached));
    }

    let mut builder = backend
        .request(method, url, token.as_ref())
        .headers(forwarded);

    if is_multipart(request.headers()) {
        let form = multipart_form(request).await?;
        builder = builder.multipart(form);
    } else {
        if let Some(content_type) = request.headers().get(CONTENT_TYPE) {
            builder = builder.header(CONTENT_TYPE, content_type.clone());
        }
        let limit = state.config().max_body_bytes;
        let body = axum::body::to_bytes(request.into_body(), limit)
            .await
            .map_err(|_| AppError::PayloadTooLarge("Request body is too large".to_string()))?;
        if !body.is_empty() {
            builder = builder.body(body);
        }
    }

    let upstream = backend.forward(builder).await?;
    let status = upstream.status();

    if !status.is_success() {
        let text = upstream.text().await.unwrap_or_default();
        let message = error_message(&text);
        tracing::debug!(status = %status, message = %message, "Backend rejected forwarded request");
        return Ok((status, Envelope::<()>::failure(message)).into_response());
    }

    let mut headers = HeaderMap::new();
    for name in [CONTENT_TYPE, CACHE_CONTROL] {
        if let Some(value) = upstream.headers().get(&name) {
            headers.insert(name, value.clone());
        }
    }

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.trim_start().to_ascii_lowercase().starts_with("multipart/form-data"))
}

/// Re-encode an inbound multipart body as an outbound form.
///
/// File parts keep their file name and content type; other parts are sent as
/// text.
async fn multipart_form(request: Request) -> Result<Form> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?;

    let mut form = Form::new();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(String::from);
        let content_type = field.content_type().map(String::from);
        let data = field.bytes().await.map_err(multipart_error)?;

        let part = match file_name {
            Some(file_name) => {
                let part = Part::bytes(data.to_vec()).file_name(file_name);
                match content_type {
                    Some(mime) => part
                        .mime_str(&mime)
                        .map_err(|_| AppError::BadRequest(format!("Invalid content type: {mime}")))?,
                    None => part,
                }
            }
            None => Part::text(String::from_utf8_lossy(&data).into_owned()),
        };
        form = form.part(name, part);
    }

    Ok(form)
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Upload is too large".to_string())
    } else {
        AppError::BadRequest(err.body_text())
    }
}

fn cached_response(cached: CachedResponse) -> Response {
    if !cached.status.is_success() {
        let message = error_message(&String::from_utf8_lossy(&cached.body));
        return (cached.status, Envelope::<()>::failure(message)).into_response();
    }

    let mut response = Response::new(Body::from(cached.body));
    *response.status_mut() = cached.status;
    if let Some(content_type) = cached.content_type {
        response.headers_mut().insert(CONTENT_TYPE, content_type);
    }
    response
}
