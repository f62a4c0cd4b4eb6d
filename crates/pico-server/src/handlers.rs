use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use serde_json::json;

use pico_feed::{Feed, PublicKey};
use pico_silo::{Silo, SiteStat};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::ingest::read_bounded;

/// Media type for raw encoded feeds on the wire.
pub const FEED_CONTENT_TYPE: &str = "pico/feed";

#[derive(Clone)]
pub struct AppState {
    pub silo: Arc<Silo>,
    pub config: Arc<ServerConfig>,
}

/// One entry of the `GET /` listing, keys and signatures hex-encoded.
#[derive(Debug, Serialize)]
pub struct ListingRow {
    pub key: String,
    pub date: i64,
    pub title: String,
    pub runlevel: u8,
    pub size: usize,
    pub hits: u64,
    pub signature: String,
}

fn parse_key(raw: &str) -> ServerResult<PublicKey> {
    PublicKey::from_hex(raw).map_err(|_| ServerError::BadKey(raw.to_string()))
}

/// `POST /:key` — ingest a new version of a site.
pub async fn post_site(
    State(state): State<AppState>,
    Path(key): Path<String>,
    headers: HeaderMap,
    body: Body,
) -> ServerResult<impl IntoResponse> {
    let key = parse_key(&key)?;

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or("").trim().to_ascii_lowercase())
        .unwrap_or_default();
    if content_type != FEED_CONTENT_TYPE {
        return Err(ServerError::UnsupportedMediaType(content_type));
    }

    let declared = match headers.get(header::CONTENT_LENGTH) {
        None => return Err(ServerError::LengthRequired),
        Some(v) => v
            .to_str()
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .ok_or_else(|| {
                ServerError::BadLength(String::from_utf8_lossy(v.as_bytes()).into_owned())
            })?,
    };

    let bytes = read_bounded(
        body,
        declared,
        state.config.max_feed_size,
        state.config.body_timeout(),
    )
    .await?;

    let feed = Feed::decode(&bytes)?;
    let block = feed.last().ok_or(ServerError::EmptyFeed)?;
    if block.key != key {
        return Err(ServerError::KeyMismatch);
    }

    if state.silo.put(&feed)? {
        Ok((StatusCode::CREATED, Json(json!({ "done": true }))))
    } else {
        Err(ServerError::NotModified)
    }
}

/// `GET /:key` — the site itself, raw feed or rendered HTML per `Accept`.
pub async fn get_site(
    State(state): State<AppState>,
    Path(key): Path<String>,
    headers: HeaderMap,
) -> ServerResult<Response> {
    let key = parse_key(&key)?;
    let feed = state.silo.get(&key)?.ok_or(ServerError::NotFound)?;

    let accept = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if accept.contains(FEED_CONTENT_TYPE) {
        return Ok((
            [(header::CONTENT_TYPE, FEED_CONTENT_TYPE)],
            feed.encode(),
        )
            .into_response());
    }

    let site = pico_wire::unpack(&feed)?;
    let mut response = Response::new(Body::from(site.html));
    // Relay the site's embedded headers; anything that is not a legal HTTP
    // header is dropped rather than failing the whole response.
    for (name, value) in site.headers.iter() {
        let Ok(name) = HeaderName::from_bytes(name.as_bytes()) else {
            continue;
        };
        let Ok(value) = HeaderValue::from_str(value) else {
            continue;
        };
        response.headers_mut().append(name, value);
    }
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    Ok(response)
}

/// `GET /stat/:key` — index entry plus hit count, without counting a visit.
pub async fn site_stat(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ServerResult<Json<SiteStat>> {
    let key = parse_key(&key)?;
    let stat = state.silo.stat(&key)?.ok_or(ServerError::NotFound)?;
    Ok(Json(stat))
}

/// `GET /` — every known site.
pub async fn list_sites(
    State(state): State<AppState>,
) -> ServerResult<Json<Vec<ListingRow>>> {
    let rows = state
        .silo
        .list()?
        .into_iter()
        .map(|l| ListingRow {
            key: l.key.to_hex(),
            date: l.date,
            title: l.title,
            runlevel: l.runlevel,
            size: l.size,
            hits: l.hits,
            signature: l.signature.to_hex(),
        })
        .collect();
    Ok(Json(rows))
}
