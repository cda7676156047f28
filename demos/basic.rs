//! Middleware stacking, groups, and scoped middleware.
//!
//! Run with:
//!   RUST_LOG=info,tsu_stack=debug cargo run --example basic
//!
//! Try:
//!   curl http://localhost:8080/base/ada
//!   curl http://localhost:8080/api/foo
//!   curl http://localhost:8080/api/admin                          → 401
//!   curl -H 'authorization: Bearer x' http://localhost:8080/api/admin
//!   curl http://localhost:8080/healthz

use tracing::info;
use tracing_subscriber::EnvFilter;
use tsu_stack::{
    GroupOptions, Middleware, Next, Request, Response, Router, Server, StatusCode, middleware,
};

#[derive(Clone)]
struct Caller(String);

#[tokio::main]
async fn main() -> Result<(), tsu_stack::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut app = Router::with_middleware([middleware::trace()]);
    app.use_fn(|next: Next, req: Request| {
        info!("in root middleware");
        let inner = next.run(req);
        async move {
            let res = inner.await;
            info!("after next");
            res
        }
    });

    // `/api` starts from scratch: neither trace nor the root middleware.
    let mut api = app.group("/api", GroupOptions::clear());
    api.use_fn(|next: Next, req: Request| {
        info!("api only");
        next.run(req)
    });

    app.with_fn(|next: Next, req: Request| {
        info!("with middleware");
        next.run(req)
    })
    .get("/base/{name}", greet)?;

    api.get("/foo", |_req: Request| async { "foo" })?;

    let auth = Middleware::from_fn(require_caller);
    let admin = api.with([auth.clone()]);
    admin.get("/admin", whoami)?;
    admin.skip([&auth]).get("/admin/help", |_req: Request| async { "ask an admin" })?;

    app.get("/healthz", |_req: Request| async { "ok" })?;

    Server::bind("0.0.0.0:8080").serve(app).await
}

/// Rejects requests without an `authorization` header; otherwise records
/// the caller for the handler.
async fn require_caller(next: Next, mut req: Request) -> Response {
    let Some(token) = req.header("authorization").map(str::to_owned) else {
        return Response::status(StatusCode::UNAUTHORIZED);
    };
    req.extensions_mut().insert(Caller(token));
    next.run(req).await
}

// GET /base/{name}
async fn greet(req: Request) -> String {
    format!("Hello, {}", req.param("name").unwrap_or_default())
}

// GET /api/admin
async fn whoami(req: Request) -> String {
    match req.extensions().get::<Caller>() {
        Some(Caller(token)) => format!("caller: {token}"),
        None => "caller: unknown".to_owned(),
    }
}
