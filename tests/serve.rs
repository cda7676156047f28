//! End-to-end: a real socket, a real hyper connection, the whole chain.

use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tsu_stack::{GroupOptions, Next, Request, Response, Router, Server, StatusCode, middleware};

async fn roundtrip(addr: std::net::SocketAddr, raw: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw.as_bytes()).await.unwrap();
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.unwrap();
    String::from_utf8(buf).unwrap()
}

#[tokio::test]
async fn serves_grouped_routes_through_their_middleware() {
    let seen = Arc::new(Mutex::new(Vec::<String>::new()));

    let log = Arc::clone(&seen);
    let app = Router::with_middleware([middleware::trace()]);
    let api = app.group("/api", ());
    let api = api.with_fn(move |next: Next, req: Request| {
        log.lock().unwrap().push(req.path().to_owned());
        let inner = next.run(req);
        async move {
            let mut res = inner.await;
            res.set_header("x-api", "1");
            res
        }
    });
    api.post("/echo/{name}", |req: Request| async move {
        let name = req.param("name").unwrap_or_default().to_owned();
        let body = String::from_utf8_lossy(req.body()).into_owned();
        Response::builder().status(StatusCode::CREATED).text(format!("{name}:{body}"))
    })
    .unwrap();
    app.group("/open", GroupOptions::clear())
        .get("/ping", |_req: Request| async { "pong" })
        .unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();
    let server = tokio::spawn(Server::serve_on(listener, app, async {
        let _ = stopped.await;
    }));

    let created = roundtrip(
        addr,
        "POST /api/echo/ada HTTP/1.1\r\nhost: test\r\ncontent-length: 5\r\nconnection: close\r\n\r\nhello",
    )
    .await;
    assert!(created.starts_with("HTTP/1.1 201"), "{created}");
    assert!(created.contains("x-api: 1"), "{created}");
    assert!(created.ends_with("ada:hello"), "{created}");

    let pong = roundtrip(addr, "GET /open/ping HTTP/1.1\r\nhost: test\r\nconnection: close\r\n\r\n").await;
    assert!(pong.starts_with("HTTP/1.1 200"), "{pong}");
    assert!(!pong.contains("x-api"), "{pong}");

    let missing = roundtrip(addr, "GET /api/nope HTTP/1.1\r\nhost: test\r\nconnection: close\r\n\r\n").await;
    assert!(missing.starts_with("HTTP/1.1 404"), "{missing}");

    assert_eq!(*seen.lock().unwrap(), ["/api/echo/ada"]);

    stop.send(()).unwrap();
    server.await.unwrap().unwrap();
}
