//! Middleware composition.
//!
//! The first middleware in a sequence is the outermost layer: it runs first
//! on the way in and last on the way out.
//!
//! ```text
//! [A, B, C] around H
//!
//! A ─► B ─► C ─► H
//! A ◄─ B ◄─ C ◄──┘
//! ```

use crate::handler::{BoxedHandler, Handler, Next};
use crate::middleware::Middleware;

/// Wraps `handler` in every middleware of `middleware`, first one outermost.
///
/// An empty sequence returns `handler` as is.
///
/// ```rust
/// use tsu_stack::{Middleware, Next, Request, chain};
///
/// let tag = Middleware::from_fn(|next: Next, req: Request| {
///     let inner = next.run(req);
///     async move {
///         let mut res = inner.await;
///         res.set_header("x-tag", "1");
///         res
///     }
/// });
///
/// let app = chain::compose(&[tag], |_req: Request| async { "hi" });
/// # let _ = app;
/// ```
pub fn compose(middleware: &[Middleware], handler: impl Handler) -> Next {
    Next(compose_boxed(middleware, handler.into_boxed_handler()))
}

/// Innermost first: the last middleware wraps `handler`, each earlier one
/// wraps the result.
pub(crate) fn compose_boxed(middleware: &[Middleware], handler: BoxedHandler) -> BoxedHandler {
    middleware.iter().rev().fold(handler, |inner, mw| mw.wrap(inner))
}
