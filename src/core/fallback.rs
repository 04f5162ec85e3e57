//! One-shot transit fallback
//!
//! A transit request between points the transit network does not connect is
//! retried once as a driving request. Nothing else is retried: transport
//! failures surface immediately.

use std::future::Future;

use tracing::warn;

use crate::core::error::BackendError;
use crate::core::model::{RouteRequest, TransportMode};

/// Where a request is in the fallback policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    /// First call, as requested
    Direct,
    /// Re-issued with the substitute mode; terminal
    Retried,
}

/// Successful outcome plus the request that produced it
#[derive(Debug)]
pub struct Routed<T> {
    pub output: T,
    /// Request actually routed; its mode is the post-fallback mode
    pub request: RouteRequest,
    pub attempt: Attempt,
}

/// Mode substituted for transit when the transit network cannot connect the points
pub const FALLBACK_MODE: TransportMode = TransportMode::Auto;

/// Run `operation`, retrying exactly once under `FALLBACK_MODE` when a
/// transit request comes back `NotConnected`.
///
/// `operation` performs adapter selection and the backend call, so the retry
/// re-selects the adapter for the substituted mode.
pub async fn with_transit_fallback<F, Fut, T>(
    req: &RouteRequest,
    operation: F,
) -> Result<Routed<T>, BackendError>
where
    F: Fn(RouteRequest) -> Fut,
    Fut: Future<Output = Result<T, BackendError>>,
{
    let mut attempt = Attempt::Direct;
    let mut current = req.clone();

    loop {
        match operation(current.clone()).await {
            Ok(output) => {
                return Ok(Routed {
                    output,
                    request: current,
                    attempt,
                })
            }
            Err(BackendError::NotConnected)
                if attempt == Attempt::Direct && current.mode == TransportMode::Transit =>
            {
                warn!(
                    from = %current.mode,
                    to = %FALLBACK_MODE,
                    "Transit network does not connect the locations, retrying once"
                );
                attempt = Attempt::Retried;
                current = current.with_mode(FALLBACK_MODE);
            }
            Err(e) => return Err(e),
        }
    }
}
