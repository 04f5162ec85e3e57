//! Shared, read-only engine state
//!
//! One `NavService` is built at startup and shared behind an `Arc` by every
//! request. It holds nothing mutable.

use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use tracing::info;

use crate::core::assemble::assemble;
use crate::core::config::NavConfig;
use crate::core::error::{Error, Result};
use crate::core::fallback::with_transit_fallback;
use crate::core::geocode::{geocode, GeocodeResult};
use crate::core::model::{RouteRequest, RouteResult};
use crate::core::provider::route_once;

/// Entry point for routing and geocoding
#[derive(Debug, Clone)]
pub struct NavService {
    config: NavConfig,
    client: Client,
}

impl NavService {
    /// Build the service and its pooled HTTP client
    pub fn new(config: NavConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .tcp_keepalive(Duration::from_secs(60))
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(Duration::from_secs(config.request_timeout_secs.min(10)))
            .user_agent(format!("fujinav/{}", env!("FUJINAV_VERSION")))
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Route a validated request, applying the transit fallback
    pub async fn route(&self, req: &RouteRequest) -> Result<RouteResult> {
        let client = &self.client;
        let config = &self.config;

        let routed = with_transit_fallback(req, |r| async move {
            route_once(client, config, &r).await
        })
        .await?;

        let result = assemble(&routed.request, routed.output)?;
        info!(
            requested = %req.mode,
            routed = %result.mode,
            steps = result.steps.len(),
            points = result.path.length,
            "Route assembled"
        );
        Ok(result)
    }

    /// Geocode a free-text query
    pub async fn geocode(&self, query: &str) -> Result<Vec<GeocodeResult>> {
        geocode(&self.client, &self.config, query).await
    }
}
