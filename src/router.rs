//! The application router: a route table plus an ordered middleware stack.
//!
//! Every registration freezes the router's *current* middleware around the
//! handler before it goes into the table. Derived routers ([`Router::group`],
//! [`Router::with`], [`Router::skip`]) share the table but own a copy of the
//! stack, so changing one never changes another, and changing any of them
//! never reaches routes already registered.

use std::borrow::Borrow;
use std::future::Future;

use http::Method;
use tracing::debug;

use crate::chain::compose_boxed;
use crate::error::Error;
use crate::handler::{Handler, Next};
use crate::middleware::Middleware;
use crate::mux::{Mux, Route};
use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// The application router.
///
/// Build it once at startup, register routes, then pass it to
/// [`Server::serve`](crate::Server::serve). Registration and
/// [`use_middleware`](Router::use_middleware) belong to setup; once serving,
/// the router is only read.
///
/// ```rust
/// use tsu_stack::{GroupOptions, Middleware, Next, Request, Router, middleware};
///
/// # fn main() -> Result<(), tsu_stack::Error> {
/// let auth = Middleware::from_fn(|next: Next, req: Request| next.run(req));
///
/// let app = Router::with_middleware([middleware::trace()]);
///
/// let api = app.group("/api", auth.clone());
/// api.get("/items", |_req: Request| async { "items" })?;
///
/// // No middleware at all under /public.
/// app.group("/public", GroupOptions::clear())
///     .get("/status", |_req: Request| async { "up" })?;
///
/// // Everything `api` has except `auth`.
/// api.skip([&auth]).get("/items/count", |_req: Request| async { "3" })?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct Router {
    mux: Mux,
    middleware: Vec<Middleware>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// A root router that starts with `middleware` already in its stack.
    pub fn with_middleware(middleware: impl IntoIterator<Item = Middleware>) -> Self {
        Self { mux: Mux::default(), middleware: middleware.into_iter().collect() }
    }

    // ── Registration ──────────────────────────────────────────────────────────

    pub fn get(&self, pattern: &str, handler: impl Handler) -> Result<Route, Error> {
        self.route(Method::GET, pattern, handler)
    }

    pub fn post(&self, pattern: &str, handler: impl Handler) -> Result<Route, Error> {
        self.route(Method::POST, pattern, handler)
    }

    pub fn put(&self, pattern: &str, handler: impl Handler) -> Result<Route, Error> {
        self.route(Method::PUT, pattern, handler)
    }

    pub fn patch(&self, pattern: &str, handler: impl Handler) -> Result<Route, Error> {
        self.route(Method::PATCH, pattern, handler)
    }

    pub fn delete(&self, pattern: &str, handler: impl Handler) -> Result<Route, Error> {
        self.route(Method::DELETE, pattern, handler)
    }

    /// Registers `handler` for one method.
    ///
    /// Patterns use `{name}` for a segment parameter and `{*name}` for a
    /// trailing catch-all. A pattern must start with `/`, or be empty to
    /// mount at a group's prefix; anything else is [`Error::Pattern`]. A
    /// pattern the table already holds for the same method is rejected
    /// with [`Error::Route`].
    pub fn route(&self, method: Method, pattern: &str, handler: impl Handler) -> Result<Route, Error> {
        self.register(Some(method), pattern, handler)
    }

    /// Registers `handler` for every method. Method-specific routes on the
    /// same path take precedence.
    pub fn handle(&self, pattern: &str, handler: impl Handler) -> Result<Route, Error> {
        self.register(None, pattern, handler)
    }

    fn register(&self, method: Option<Method>, pattern: &str, handler: impl Handler) -> Result<Route, Error> {
        let composed = compose_boxed(&self.middleware, handler.into_boxed_handler());
        let route = self.mux.register(method, pattern, composed)?;
        debug!(
            method = route.method().map_or("*", Method::as_str),
            path = route.path(),
            layers = self.middleware.len(),
            "route registered"
        );
        Ok(route)
    }

    // ── Middleware stack ──────────────────────────────────────────────────────

    /// Appends to this router's stack. Only routes registered afterwards see
    /// the new middleware.
    pub fn use_middleware(&mut self, middleware: impl IntoIterator<Item = Middleware>) -> &mut Self {
        self.middleware.extend(middleware);
        self
    }

    /// [`use_middleware`](Router::use_middleware) for a `(next, request)`
    /// function. See [`Middleware::from_fn`].
    ///
    /// Takes one function; call it once per function, in order
    /// (`r.use_fn(a).use_fn(b)`). Each closure is its own type, so a list
    /// of them would have to be boxed first.
    pub fn use_fn<F, Fut, R>(&mut self, f: F) -> &mut Self
    where
        F: Fn(Next, Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse + Send + 'static,
    {
        self.use_middleware([Middleware::from_fn(f)])
    }

    /// A router mounted at `prefix` below this one, on the same table.
    ///
    /// `options` decides its starting stack: anything convertible into
    /// [`GroupOptions`] other than [`GroupOptions::clear`] inherits this
    /// router's stack and appends the given middleware.
    pub fn group(&self, prefix: &str, options: impl Into<GroupOptions>) -> Router {
        let GroupOptions { inherit_middleware, extra } = options.into();
        let mut middleware = if inherit_middleware {
            self.middleware.clone()
        } else {
            Vec::new()
        };
        middleware.extend(extra);
        Router { mux: self.mux.subrouter(prefix), middleware }
    }

    /// A router on the same table and prefix whose stack is this one's plus
    /// `middleware`. `self` is left untouched.
    ///
    /// ```rust
    /// # use tsu_stack::{Middleware, Next, Request, Router};
    /// # fn main() -> Result<(), tsu_stack::Error> {
    /// # let audit = Middleware::from_fn(|next: Next, req: Request| next.run(req));
    /// let app = Router::new();
    /// app.with([audit]).delete("/items/{id}", |_req: Request| async { "gone" })?;
    /// app.get("/items/{id}", |_req: Request| async { "item" })?; // no audit
    /// # Ok(())
    /// # }
    /// ```
    pub fn with(&self, middleware: impl IntoIterator<Item = Middleware>) -> Router {
        let mut stack = self.middleware.clone();
        stack.extend(middleware);
        Router { mux: self.mux.clone(), middleware: stack }
    }

    /// [`with`](Router::with) for a `(next, request)` function.
    ///
    /// Takes one function; chain calls for more
    /// (`r.with_fn(a).with_fn(b).get(..)`), or build [`Middleware`]s with
    /// [`Middleware::from_fn`] and pass them to [`with`](Router::with).
    pub fn with_fn<F, Fut, R>(&self, f: F) -> Router
    where
        F: Fn(Next, Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse + Send + 'static,
    {
        self.with([Middleware::from_fn(f)])
    }

    /// A router on the same table and prefix whose stack is this one's minus
    /// every entry that *is* one of `middleware` (same [`MiddlewareId`],
    /// i.e. the same constructor call or a clone of it).
    ///
    /// [`MiddlewareId`]: crate::middleware::MiddlewareId
    pub fn skip<M>(&self, middleware: impl IntoIterator<Item = M>) -> Router
    where
        M: Borrow<Middleware>,
    {
        let removed: Vec<_> = middleware.into_iter().map(|m| m.borrow().id()).collect();
        let stack = self.middleware.iter()
            .filter(|m| !removed.contains(&m.id()))
            .cloned()
            .collect();
        Router { mux: self.mux.clone(), middleware: stack }
    }

    // ── Accessors & dispatch ──────────────────────────────────────────────────

    /// The stack new routes on this router are wrapped in, outermost first.
    pub fn middleware(&self) -> &[Middleware] {
        &self.middleware
    }

    /// The path prefix this router registers under (`""` for a root).
    pub fn prefix(&self) -> &str {
        self.mux.prefix()
    }

    /// Routes `req` through the shared table. The router itself matches
    /// nothing; the table answers `404` / `405` when no route fits.
    pub async fn dispatch(&self, req: Request) -> Response {
        self.mux.dispatch(req).await
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("prefix", &self.prefix())
            .field("middleware", &self.middleware)
            .finish_non_exhaustive()
    }
}

// ── GroupOptions ──────────────────────────────────────────────────────────────

/// How a [`Router::group`] builds its starting stack.
///
/// `Middleware`, arrays, and `Vec`s of middleware convert into "inherit and
/// append"; `()` into "inherit, nothing extra".
#[derive(Clone, Debug)]
pub struct GroupOptions {
    /// Start from the parent's stack (`true`) or from nothing (`false`).
    pub inherit_middleware: bool,
    /// Appended after whatever was inherited.
    pub extra: Vec<Middleware>,
}

impl GroupOptions {
    /// Inherit the parent's stack.
    pub fn inherit() -> Self {
        Self { inherit_middleware: true, extra: Vec::new() }
    }

    /// Drop the parent's stack.
    pub fn clear() -> Self {
        Self { inherit_middleware: false, extra: Vec::new() }
    }

    /// Appends `middleware` to the group's stack.
    pub fn with(mut self, middleware: impl IntoIterator<Item = Middleware>) -> Self {
        self.extra.extend(middleware);
        self
    }
}

impl Default for GroupOptions {
    fn default() -> Self { Self::inherit() }
}

impl From<()> for GroupOptions {
    fn from((): ()) -> Self { Self::inherit() }
}

impl From<Middleware> for GroupOptions {
    fn from(middleware: Middleware) -> Self { Self::inherit().with([middleware]) }
}

impl From<Vec<Middleware>> for GroupOptions {
    fn from(middleware: Vec<Middleware>) -> Self { Self::inherit().with(middleware) }
}

impl<const N: usize> From<[Middleware; N]> for GroupOptions {
    fn from(middleware: [Middleware; N]) -> Self { Self::inherit().with(middleware) }
}
