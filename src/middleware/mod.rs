//! Middleware: decorators from one handler to another.
//!
//! A [`Middleware`] is a function `Next -> Handler`. Given the rest of the
//! chain, it returns the handler that runs in its place. Two ways to make
//! one:
//!
//! - [`Middleware::from_fn`] for the common `(next, request) -> response`
//!   shape. Call `next.run(req)` to continue, or return early to stop.
//! - [`Middleware::new`] when you need full control over the wrapping step.
//!
//! ```rust
//! use tsu_stack::{Middleware, Next, Request, Response, StatusCode};
//!
//! let auth = Middleware::from_fn(|next: Next, req: Request| async move {
//!     if req.header("authorization").is_none() {
//!         return Response::status(StatusCode::UNAUTHORIZED);
//!     }
//!     next.run(req).await
//! });
//! # let _ = auth;
//! ```
//!
//! # Identity
//!
//! Every constructor call mints a fresh [`MiddlewareId`]. Clones share it.
//! [`Router::skip`](crate::Router::skip) removes entries by id, so two
//! middleware built from identical code are still different middleware.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::handler::{BoxedHandler, Handler, Next};
use crate::request::Request;
use crate::response::IntoResponse;

mod trace;

pub use trace::trace;

/// Stable identity token of a [`Middleware`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct MiddlewareId(u64);

impl MiddlewareId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

type WrapFn = dyn Fn(BoxedHandler) -> BoxedHandler + Send + Sync + 'static;

/// A request-handling decorator.
#[derive(Clone)]
pub struct Middleware {
    id: MiddlewareId,
    wrap: Arc<WrapFn>,
}

impl Middleware {
    /// Creates a middleware from its wrapping step.
    ///
    /// `wrap` is called once per route registration with the rest of that
    /// route's chain and must return the handler to run in its place.
    ///
    /// ```rust
    /// use tsu_stack::{Middleware, Next, Request};
    ///
    /// let banner = Middleware::new(|next: Next| {
    ///     move |req: Request| {
    ///         let inner = next.run(req);
    ///         async move {
    ///             let mut res = inner.await;
    ///             res.set_header("x-banner", "hello");
    ///             res
    ///         }
    ///     }
    /// });
    /// # let _ = banner;
    /// ```
    pub fn new<F, H>(wrap: F) -> Self
    where
        F: Fn(Next) -> H + Send + Sync + 'static,
        H: Handler,
    {
        Self {
            id: MiddlewareId::next(),
            wrap: Arc::new(move |inner: BoxedHandler| wrap(Next(inner)).into_boxed_handler()),
        }
    }

    /// Adapts a `(next, request) -> response` function into a middleware.
    ///
    /// Every wrap builds a fresh handler that owns its own `next`; the only
    /// state shared between routes and requests is whatever `f` captured.
    pub fn from_fn<F, Fut, R>(f: F) -> Self
    where
        F: Fn(Next, Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse + Send + 'static,
    {
        let f = Arc::new(f);
        Self::new(move |next: Next| {
            let f = Arc::clone(&f);
            move |req: Request| f(next.clone(), req)
        })
    }

    pub fn id(&self) -> MiddlewareId {
        self.id
    }

    pub(crate) fn wrap(&self, inner: BoxedHandler) -> BoxedHandler {
        (self.wrap)(inner)
    }
}

impl PartialEq for Middleware {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Middleware {}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Middleware").field(&self.id.0).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    use http::{Method, StatusCode};

    use super::*;
    use crate::response::Response;

    fn terminal() -> BoxedHandler {
        (|_req: Request| async { "done" }).into_boxed_handler()
    }

    #[test]
    fn clones_share_identity_and_constructions_do_not() {
        let a = Middleware::from_fn(|next: Next, req: Request| next.run(req));
        let b = Middleware::from_fn(|next: Next, req: Request| next.run(req));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_ne!(a.id(), b.id());
    }

    #[tokio::test]
    async fn from_fn_can_short_circuit() {
        let deny = Middleware::from_fn(|_next: Next, _req: Request| async {
            StatusCode::FORBIDDEN
        });
        let res = deny.wrap(terminal()).call(Request::new(Method::GET, "/")).await;
        assert_eq!(res.status_code(), StatusCode::FORBIDDEN);
        assert!(res.body().is_empty());
    }

    #[tokio::test]
    async fn from_fn_builds_a_fresh_handler_per_wrap() {
        let wraps = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let counter = Arc::clone(&wraps);
        let log = Arc::clone(&seen);
        let mw = Middleware::new(move |next: Next| {
            counter.fetch_add(1, Ordering::SeqCst);
            let log = Arc::clone(&log);
            move |req: Request| {
                log.lock().unwrap().push(req.path().to_owned());
                next.run(req)
            }
        });

        let first = mw.wrap((|_req: Request| async { "first" }).into_boxed_handler());
        let second = mw.wrap((|_req: Request| async { "second" }).into_boxed_handler());
        assert_eq!(wraps.load(Ordering::SeqCst), 2);
        assert!(!Arc::ptr_eq(&first, &second));

        let a: Response = first.call(Request::new(Method::GET, "/a")).await;
        let b: Response = second.call(Request::new(Method::GET, "/b")).await;
        assert_eq!(a.body(), b"first");
        assert_eq!(b.body(), b"second");
        assert_eq!(*seen.lock().unwrap(), ["/a", "/b"]);
    }
}
