use crate::state::AppState;
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use urlz_core::ShortCode;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

const UNKNOWN_CLIENT: &str = "unknown";

/// Key identifying the caller for rate limiting.
///
/// The peer address of the connection. When that peer is a trusted proxy,
/// the first `X-Forwarded-For` entry it reports is used instead. Requests
/// without a known peer share one bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl ClientIp {
    fn from_parts(headers: &HeaderMap, peer: Option<SocketAddr>, trust_peer: bool) -> Self {
        let Some(peer) = peer else {
            return Self(UNKNOWN_CLIENT.to_string());
        };

        let forwarded = headers
            .get(X_FORWARDED_FOR)
            .filter(|_| trust_peer)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|first| !first.is_empty());

        match forwarded {
            Some(first) => Self(first.to_string()),
            None => Self(peer.ip().to_string()),
        }
    }
}

impl FromRequestParts<AppState> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        let trust_peer = peer.is_some_and(|addr| state.config().is_trusted_proxy(addr.ip()));

        Ok(Self::from_parts(&parts.headers, peer, trust_peer))
    }
}

/// `{scheme}://{host}{base_path}{id}` as seen by the client.
///
/// The scheme comes from `X-Forwarded-Proto`, defaulting to `http`.
pub fn shortened_url(headers: &HeaderMap, base_path: &str, code: &ShortCode) -> String {
    let scheme = headers
        .get(X_FORWARDED_PROTO)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .unwrap_or("http");
    let host = headers
        .get(axum::http::header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");

    code.to_url(&format!("{scheme}://{host}{base_path}"))
}
