use axum::{body::Body, extract::ConnectInfo};
use governor::{clock::QuantaInstant, middleware::NoOpMiddleware};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tower_governor::{
    GovernorLayer, errors::GovernorError, governor::GovernorConfigBuilder,
    key_extractor::KeyExtractor,
};

pub type AuthRateLimitLayer =
    GovernorLayer<SmartIpKeyExtractor, NoOpMiddleware<QuantaInstant>, Body>;

/// Keys on the peer address, or loopback when there is none (e.g. in tests)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SmartIpKeyExtractor;

impl KeyExtractor for SmartIpKeyExtractor {
    type Key = IpAddr;

    fn extract<B>(&self, req: &axum::http::Request<B>) -> Result<Self::Key, GovernorError> {
        Ok(req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST)))
    }
}

/// Per-IP limiter that refills `requests_per_minute` tokens evenly across a minute
pub fn rate_limit_layer(requests_per_minute: u64) -> anyhow::Result<AuthRateLimitLayer> {
    if requests_per_minute == 0 {
        anyhow::bail!("Rate limit must allow at least one request per minute");
    }
    let quota_duration_ms = (60_000 / requests_per_minute).max(1);
    let burst = u32::try_from(requests_per_minute).unwrap_or(u32::MAX);

    let config = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(quota_duration_ms)
            .burst_size(burst)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Failed to finish governor config"))?,
    );

    Ok(GovernorLayer::new(config))
}
