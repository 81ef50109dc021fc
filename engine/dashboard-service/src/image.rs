//! Conditional serving of the rendered dashboard image

use chrono::{DateTime, TimeZone, Utc};
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::{debug, error};
use warp::http::header::{CACHE_CONTROL, CONTENT_TYPE, LAST_MODIFIED};
use warp::http::StatusCode;
use warp::Reply;

use crate::error::ServiceError;

/// IMF-fixdate as used by Last-Modified
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// True when the client copy is at least as new as the file.
///
/// Both sides are compared in whole seconds. A missing or unparseable header never
/// short-circuits.
pub fn is_not_modified(file_mtime_secs: i64, if_modified_since: Option<&str>) -> bool {
    let Some(header) = if_modified_since else {
        return false;
    };

    match DateTime::parse_from_rfc2822(header.trim()) {
        Ok(client) => file_mtime_secs <= client.timestamp(),
        Err(e) => {
            debug!("Ignoring unparseable If-Modified-Since '{}': {}", header, e);
            false
        }
    }
}

/// Format seconds since the epoch as an HTTP date
pub fn http_date(secs: i64) -> Option<String> {
    Utc.timestamp_opt(secs, 0).single().map(|t| t.format(HTTP_DATE_FORMAT).to_string())
}

async fn modified_secs(path: &Path) -> Result<Option<i64>, ServiceError> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let modified = metadata.modified()?;
    let secs = modified
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default();
    Ok(Some(secs))
}

async fn read_image(path: &Path) -> Result<Vec<u8>, ServiceError> {
    Ok(tokio::fs::read(path).await?)
}

fn json_error(status: StatusCode, message: &str) -> warp::reply::Response {
    warp::reply::with_status(warp::reply::json(&serde_json::json!({ "error": message })), status)
        .into_response()
}

/// Handler for GET /api/current_image
pub async fn current_image(
    path: PathBuf,
    if_modified_since: Option<String>,
) -> Result<warp::reply::Response, Infallible> {
    let mtime = match modified_secs(&path).await {
        Ok(Some(mtime)) => mtime,
        Ok(None) => return Ok(json_error(StatusCode::NOT_FOUND, "Image not found")),
        Err(e) => {
            error!("Failed to stat {:?}: {}", path, e);
            return Ok(json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read image"));
        }
    };

    if is_not_modified(mtime, if_modified_since.as_deref()) {
        return Ok(warp::reply::with_status(warp::reply(), StatusCode::NOT_MODIFIED).into_response());
    }

    let bytes = match read_image(&path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Failed to read {:?}: {}", path, e);
            return Ok(json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read image"));
        }
    };

    let reply = warp::reply::with_header(bytes, CONTENT_TYPE, "image/png");
    let reply = warp::reply::with_header(reply, LAST_MODIFIED, http_date(mtime).unwrap_or_default());
    let reply = warp::reply::with_header(reply, CACHE_CONTROL, "no-cache");
    Ok(reply.into_response())
}
