//! Rate limiting middleware using token bucket algorithm.

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::PeerIpKeyExtractor,
};

use crate::config::ThrottlerConfig;

/// Concrete layer type produced by [`layer`].
pub type RateLimitLayer =
    GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Milliseconds between replenished tokens: the window spread evenly over the limit.
fn replenish_interval_ms(config: &ThrottlerConfig) -> u64 {
    (config.ttl_ms / u64::from(config.limit.max(1))).max(1)
}

/// Creates the per-client rate limiter.
///
/// # Limits
///
/// - **Burst**: `THROTTLE_LIMIT` requests
/// - **Rate**: one request replenished every `THROTTLE_TTL / THROTTLE_LIMIT` ms
///
/// Requests exceeding the limit receive `429 Too Many Requests`, rendered in
/// the error envelope with the `TOO_MANY_REQUESTS` code.
///
/// # Key Extraction
///
/// Rate limits are applied per client IP address extracted from the
/// socket peer address, so the server must be started with connect info.
///
/// Returns `None` when throttling is disabled.
pub fn layer(config: &ThrottlerConfig) -> Option<RateLimitLayer> {
    if !config.enabled {
        return None;
    }

    let governor_conf = GovernorConfigBuilder::default()
        .per_millisecond(replenish_interval_ms(config))
        .burst_size(config.limit)
        .finish();

    match governor_conf {
        Some(conf) => Some(GovernorLayer::new(Arc::new(conf))),
        None => {
            tracing::warn!(
                ttl_ms = config.ttl_ms,
                limit = config.limit,
                "Invalid throttler settings, rate limiting disabled"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn throttler(enabled: bool, ttl_ms: u64, limit: u32) -> ThrottlerConfig {
        ThrottlerConfig {
            enabled,
            ttl_ms,
            limit,
        }
    }

    #[test]
    fn test_disabled_yields_no_layer() {
        assert!(layer(&throttler(false, 60_000, 10)).is_none());
    }

    #[test]
    fn test_enabled_yields_layer() {
        assert!(layer(&throttler(true, 60_000, 10)).is_some());
    }

    #[test]
    fn test_replenish_interval() {
        assert_eq!(replenish_interval_ms(&throttler(true, 60_000, 10)), 6_000);
        assert_eq!(replenish_interval_ms(&throttler(true, 5, 10)), 1);
    }
}
