//! Structured access logging.
//!
//! Emits `tracing` events when a request enters the pipeline and when its
//! outcome is known, recording request id, method, path, route, subject,
//! status, and round-trip latency.

use crate::error::DispatchError;
use bazaar_kernel::gateway::GatewayContext;
use tracing::{error, info, warn};

const START_ATTR: &str = "log.request_start_ms";

/// Access log that brackets every dispatched request.
#[derive(Default, Clone, Copy)]
pub struct AccessLog;

impl AccessLog {
    pub fn new() -> Self {
        Self
    }

    pub fn on_request(&self, ctx: &mut GatewayContext) {
        info!(
            request_id = %ctx.request.id,
            method     = ctx.request.method.as_str(),
            path       = %ctx.request.path,
            "→ inbound request"
        );
        // Record the start time for latency tracking on the response path.
        ctx.set_attr(START_ATTR, &now_ms());
    }

    pub fn on_response(&self, ctx: &GatewayContext, status: u16) -> u64 {
        let elapsed = self.elapsed_ms(ctx);
        let subject = ctx.identity.as_ref().map(|i| i.subject.as_str());

        if status >= 500 {
            error!(
                request_id = %ctx.request.id,
                path       = %ctx.request.path,
                route      = ctx.route_id(),
                subject    = ?subject,
                status,
                latency_ms = elapsed,
                "← upstream error response"
            );
        } else {
            info!(
                request_id = %ctx.request.id,
                path       = %ctx.request.path,
                route      = ctx.route_id(),
                subject    = ?subject,
                status,
                latency_ms = elapsed,
                "← outbound response"
            );
        }
        elapsed
    }

    pub fn on_reject(&self, ctx: &GatewayContext, err: &DispatchError) -> u64 {
        let elapsed = self.elapsed_ms(ctx);
        let status = err.status().as_u16();

        if status >= 500 {
            error!(
                request_id = %ctx.request.id,
                path       = %ctx.request.path,
                route      = ctx.route_id(),
                status,
                error      = %err,
                latency_ms = elapsed,
                "← rejected: upstream failure"
            );
        } else {
            warn!(
                request_id = %ctx.request.id,
                path       = %ctx.request.path,
                route      = ctx.route_id(),
                status,
                error      = %err,
                latency_ms = elapsed,
                "← rejected"
            );
        }
        elapsed
    }

    fn elapsed_ms(&self, ctx: &GatewayContext) -> u64 {
        let start_ms: u64 = ctx.get_attr(START_ATTR).unwrap_or(0);
        now_ms().saturating_sub(start_ms)
    }
}

fn now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    u64::try_from(
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis(),
    )
    .unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_kernel::gateway::{GatewayRequest, HttpMethod};

    #[test]
    fn request_start_is_recorded() {
        let mut ctx = GatewayContext::new(GatewayRequest::new("r", "/auth/login", HttpMethod::Post));
        AccessLog::new().on_request(&mut ctx);
        assert!(ctx.get_attr::<u64>(START_ATTR).is_some());
        assert!(AccessLog::new().on_response(&ctx, 200) < 60_000);
    }
}
