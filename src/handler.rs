//! Handler trait, type erasure, and the [`Next`] handle.
//!
//! # How handlers are stored
//!
//! Routes hold handlers of *different* concrete types, and middleware wrap
//! handlers they know nothing about. Both problems have the same answer:
//! hide the concrete type behind `dyn ErasedHandler` and pass around
//! `Arc`s of it.
//!
//! ```text
//! async fn items(req: Request) -> Response { … }   ← user writes this
//!        ↓ router.get("/items", items)
//! items.into_boxed_handler()                       ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(items))                       ← BoxedHandler
//!        ↓ compose(&middleware, boxed)
//! mw[0].wrap(mw[1].wrap(… boxed))                  ← still a BoxedHandler
//!        ↓ stored in the Mux
//! handler.call(req) at request time                ← one vtable call per layer
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to a [`Response`].
///
/// `Send + 'static` lets tokio move the future across worker threads.
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests and across every
/// middleware layer that wraps it.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// You never implement this yourself. It is satisfied by any function or
/// closure with the shape:
///
/// ```text
/// Fn(Request) -> impl Future<Output = impl IntoResponse>
/// ```
///
/// The trait is **sealed** so the blanket impl below stays the only one.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

/// Bridges a concrete handler `F` into the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

// ── Next ──────────────────────────────────────────────────────────────────────

/// The remainder of a middleware chain.
///
/// A middleware receives a `Next` when it is wrapped around a handler and
/// decides whether (and when) to call [`Next::run`]. Not calling it ends the
/// chain right there, which is how an auth check rejects a request.
///
/// Cloning is one atomic increment.
#[derive(Clone)]
pub struct Next(pub(crate) BoxedHandler);

impl Next {
    /// Runs the rest of the chain.
    ///
    /// The returned future owns everything it needs, so it can be created
    /// before an `async move` block and awaited inside it.
    pub fn run(&self, req: Request) -> impl Future<Output = Response> + Send + use<> {
        self.0.call(req)
    }
}

impl std::fmt::Debug for Next {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next").finish_non_exhaustive()
    }
}
