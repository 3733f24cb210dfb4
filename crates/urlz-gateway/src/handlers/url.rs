use crate::error::{AppError, Result};
use crate::extract::{shortened_url, ClientIp};
use crate::model::{
    CreateUrlPayload, CreateUrlResponse, DeleteUrlPayload, DeleteUrlResponse, UpdateUrlPayload,
    UpdateUrlResponse,
};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::debug;
use urlz_core::ShortCode;

const URL_UPDATED: &str = "URL updated successfully";
const URL_DELETED: &str = "URL deleted successfully";

/// Ids that could never have been issued are reported as missing.
fn parse_code(id: &str) -> Result<ShortCode> {
    ShortCode::new(id).map_err(|_| AppError::NotFound)
}

fn ensure_same_id(path: &str, payload: &str) -> Result<()> {
    if path != payload {
        return Err(AppError::IdMismatch {
            path: path.to_string(),
            payload: payload.to_string(),
        });
    }
    Ok(())
}

/// `GET {base}{id}`: 302 to the stored URL.
///
/// A client that has run out of tokens gets the same 404 as an unknown id.
pub async fn redirect_handler(
    State(state): State<AppState>,
    ClientIp(client): ClientIp,
    Path(id): Path<String>,
) -> Result<Response> {
    if !state.limiter_for(&client)?.allow() {
        debug!(client = %client, "rate limited");
        return Err(AppError::NotFound);
    }

    let code = parse_code(&id)?;
    let record = state
        .shortener()
        .resolve(&code)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok((
        StatusCode::FOUND,
        [(header::LOCATION, record.original_url)],
    )
        .into_response())
}

/// `POST {base}`
pub async fn create_url_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: std::result::Result<Json<CreateUrlPayload>, JsonRejection>,
) -> Result<Json<CreateUrlResponse>> {
    let Json(payload) = payload?;

    let code = state.shortener().shorten(&payload.url).await?;

    Ok(Json(CreateUrlResponse {
        shortened_url: shortened_url(&headers, &state.config().base_path, &code),
        id: code.to_string(),
    }))
}

/// `PUT {base}{id}`
pub async fn update_url_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    payload: std::result::Result<Json<UpdateUrlPayload>, JsonRejection>,
) -> Result<Json<UpdateUrlResponse>> {
    let Json(payload) = payload?;
    ensure_same_id(&id, &payload.id)?;

    let code = parse_code(&id)?;
    state
        .shortener()
        .update(&code, &payload.old_url, &payload.new_url)
        .await?;

    Ok(Json(UpdateUrlResponse {
        shortened_url: shortened_url(&headers, &state.config().base_path, &code),
        id,
        status: URL_UPDATED,
    }))
}

/// `DELETE {base}{id}`
pub async fn delete_url_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<DeleteUrlPayload>, JsonRejection>,
) -> Result<Json<DeleteUrlResponse>> {
    let Json(payload) = payload?;
    ensure_same_id(&id, &payload.id)?;

    let code = parse_code(&id)?;
    state.shortener().delete(&code, &payload.url).await?;

    Ok(Json(DeleteUrlResponse {
        message: URL_DELETED,
    }))
}
