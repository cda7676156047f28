//! # tsu-stack
//!
//! Ordered middleware chaining on top of a radix-tree router.
//!
//! Three ideas, nothing else:
//!
//! - **Composition.** A middleware stack `[A, B, C]` around a handler runs
//!   `A` first on the way in and last on the way out.
//! - **Scoping.** [`Router::group`] mounts a sub-router at a path prefix that
//!   inherits (or clears) its parent's stack; [`Router::with`] and
//!   [`Router::skip`] derive a router with middleware added or removed, for
//!   the next registration only.
//! - **Function middleware.** [`Middleware::from_fn`] turns an
//!   `async (next, request) -> response` function into a middleware.
//!
//! Path matching is [`matchit`]'s job; serving is hyper's.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use tsu_stack::{GroupOptions, Next, Request, Response, Router, Server, StatusCode, middleware};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), tsu_stack::Error> {
//!     let app = Router::with_middleware([middleware::trace()]);
//!
//!     let api = app.group("/api", ());
//!     let authed = api.with_fn(|next: Next, req: Request| async move {
//!         match req.header("authorization") {
//!             Some(_) => next.run(req).await,
//!             None => Response::status(StatusCode::UNAUTHORIZED),
//!         }
//!     });
//!     authed.get("/users/{id}", get_user)?;
//!     api.get("/health", |_req: Request| async { "ok" })?;
//!
//!     app.group("/static", GroupOptions::clear())
//!         .get("/{*file}", |_req: Request| async { StatusCode::NOT_FOUND })?;
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#).into_bytes())
//! }
//! ```

mod error;
mod handler;
mod mux;
mod request;
mod response;
mod router;
mod server;

pub mod chain;
pub mod middleware;

pub use error::Error;
pub use handler::{Handler, Next};
pub use http::{Method, StatusCode};
pub use middleware::{Middleware, MiddlewareId};
pub use mux::Route;
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::{GroupOptions, Router};
pub use server::Server;
