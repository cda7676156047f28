//! Per-request tracing span.

use std::time::{Duration, Instant};

use tracing::{Instrument, info, info_span};

use super::Middleware;
use crate::handler::Next;
use crate::request::Request;

/// Opens an `info` span with `method` and `path` around the rest of the
/// chain, then logs the status and latency once the response is ready.
///
/// Put it first so it measures every layer below it:
///
/// ```rust
/// use tsu_stack::{Router, middleware};
///
/// let app = Router::with_middleware([middleware::trace()]);
/// # let _ = app;
/// ```
pub fn trace() -> Middleware {
    Middleware::from_fn(|next: Next, req: Request| {
        let span = info_span!("request", method = %req.method(), path = %req.path());
        let started = Instant::now();
        let inner = next.run(req);
        async move {
            let res = inner.instrument(span.clone()).await;
            span.in_scope(|| {
                info!(
                    status = res.status_code().as_u16(),
                    latency_us = micros(started.elapsed()),
                    "request completed"
                );
            });
            res
        }
    })
}

/// Saturates instead of truncating.
fn micros(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX)
}
