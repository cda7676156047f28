//! Middleware ordering, inheritance, and removal through the public API.

use std::sync::{Arc, Mutex};

use tsu_stack::{GroupOptions, Method, Middleware, Next, Request, Router, StatusCode, chain};

type Trace = Arc<Mutex<Vec<String>>>;

fn recorder(name: &'static str, trace: &Trace) -> Middleware {
    let trace = Arc::clone(trace);
    Middleware::from_fn(move |next: Next, req: Request| {
        let trace = Arc::clone(&trace);
        async move {
            trace.lock().unwrap().push(format!("{name}-before"));
            let res = next.run(req).await;
            trace.lock().unwrap().push(format!("{name}-after"));
            res
        }
    })
}

fn drain(trace: &Trace) -> Vec<String> {
    std::mem::take(&mut *trace.lock().unwrap())
}

#[tokio::test]
async fn ordering_law() {
    let trace = Trace::default();
    let stack = [recorder("A", &trace), recorder("B", &trace), recorder("C", &trace)];

    let t = Arc::clone(&trace);
    let handler = chain::compose(&stack, move |_req: Request| {
        t.lock().unwrap().push("H".to_owned());
        async { "done" }
    });
    handler.run(Request::new(Method::GET, "/")).await;

    assert_eq!(
        drain(&trace),
        ["A-before", "B-before", "C-before", "H", "C-after", "B-after", "A-after"]
    );
}

#[tokio::test]
async fn identity_law() {
    let bare = chain::compose(&[], |req: Request| async move { format!("{} {}", req.method(), req.path()) });
    let res = bare.run(Request::new(Method::PUT, "/x")).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(res.body(), b"PUT /x");
}

#[tokio::test]
async fn logger_then_auth_under_api() {
    let trace = Trace::default();
    let root = Router::with_middleware([recorder("Logger", &trace)]);
    let api = root.group("/api", [recorder("Auth", &trace)]);
    api.get("/items", |_req: Request| async { "ok" }).unwrap();

    let res = root.dispatch(Request::new(Method::GET, "/api/items")).await;

    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(res.body(), b"ok");
    assert_eq!(drain(&trace), ["Logger-before", "Auth-before", "Auth-after", "Logger-after"]);
}

#[tokio::test]
async fn cleared_group_runs_nothing_from_its_parent() {
    let trace = Trace::default();
    let root = Router::with_middleware([recorder("Logger", &trace)]);
    root.group("/bare", GroupOptions::clear())
        .get("/x", |_req: Request| async { "bare" })
        .unwrap();

    let res = root.dispatch(Request::new(Method::GET, "/bare/x")).await;
    assert_eq!(res.body(), b"bare");
    assert!(drain(&trace).is_empty());
}

/// `skip` removes the given middleware (matched by identity); the parent
/// keeps its full stack.
#[tokio::test]
async fn skip_removes_middleware_by_identity() {
    let trace = Trace::default();
    let logger = recorder("Logger", &trace);
    let auth = recorder("Auth", &trace);
    let r = Router::with_middleware([logger.clone(), auth.clone()]);

    let skipped = r.skip([&auth]);
    assert_eq!(skipped.middleware(), [logger.clone()]);
    assert_eq!(r.middleware(), [logger, auth]);

    skipped.get("/info", |_req: Request| async { "info" }).unwrap();
    r.get("/secure", |_req: Request| async { "secure" }).unwrap();

    r.dispatch(Request::new(Method::GET, "/info")).await;
    assert_eq!(drain(&trace), ["Logger-before", "Logger-after"]);

    r.dispatch(Request::new(Method::GET, "/secure")).await;
    assert_eq!(drain(&trace), ["Logger-before", "Auth-before", "Auth-after", "Logger-after"]);
}
