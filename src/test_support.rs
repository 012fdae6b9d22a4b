// SPDX-License-Identifier: MPL-2.0

//! Loopback HTTP backend for tests.

use std::sync::mpsc;

/// A request as the fake backend saw it
#[derive(Debug)]
pub struct Captured {
    pub method: String,
    pub url: String,
    pub token: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

/// Serve the given `(status, json body)` responses in order, one per request.
/// Returns the base URL and a receiver of the captured requests.
pub fn serve(responses: Vec<(u16, &'static str)>) -> (String, mpsc::Receiver<Captured>) {
    let server = tiny_http::Server::http("127.0.0.1:0").expect("bind loopback server");
    let port = server
        .server_addr()
        .to_ip()
        .expect("loopback server has an ip address")
        .port();
    let (tx, rx) = mpsc::channel();

    std::thread::spawn(move || {
        for (status, body) in responses {
            let Ok(mut request) = server.recv() else {
                return;
            };

            let mut raw = Vec::new();
            let _ = request.as_reader().read_to_end(&mut raw);
            let header = |name: &str| {
                request
                    .headers()
                    .iter()
                    .find(|h| h.field.as_str().as_str().eq_ignore_ascii_case(name))
                    .map(|h| h.value.as_str().to_string())
            };

            let captured = Captured {
                method: request.method().as_str().to_string(),
                url: request.url().to_string(),
                token: header("token"),
                content_type: header("Content-Type"),
                body: String::from_utf8_lossy(&raw).into_owned(),
            };
            let _ = tx.send(captured);

            let content_type =
                tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                    .expect("static header is valid");
            let response = tiny_http::Response::from_string(body)
                .with_status_code(status)
                .with_header(content_type);
            let _ = request.respond(response);
        }
    });

    (format!("http://127.0.0.1:{port}"), rx)
}

/// A base URL nothing is listening on
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}
