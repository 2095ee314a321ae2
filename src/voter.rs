use std::net::SocketAddr;

use anyhow::anyhow;
use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap},
};

use crate::AppError;

pub const FORWARDED_FOR: &str = "x-forwarded-for";

/// Identity a vote is deduplicated on: the first `X-Forwarded-For` hop when
/// a proxy set one, the peer address otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoterIp(pub String);

impl<S> FromRequestParts<S> for VoterIp
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(ip) = forwarded_for(&parts.headers) {
            return Ok(Self(ip));
        }

        let ConnectInfo(addr) = ConnectInfo::<SocketAddr>::from_request_parts(parts, state)
            .await
            .map_err(|_| anyhow!("request carries neither {FORWARDED_FOR} nor a peer address"))?;

        Ok(Self(addr.ip().to_canonical().to_string()))
    }
}

fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get(FORWARDED_FOR)?
        .to_str()
        .ok()?
        .split(',')
        .next()
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_owned)
}
