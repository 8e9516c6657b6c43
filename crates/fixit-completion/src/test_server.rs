//! One-shot HTTP stub for exercising the backend clients

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub struct StubResponse {
    pub status: u16,
    pub body: Vec<String>,
    /// Keep the socket open after writing the body
    pub hold_open: Option<Duration>,
}

impl StubResponse {
    pub fn ok(body: Vec<String>) -> Self {
        Self {
            status: 200,
            body,
            hold_open: None,
        }
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self {
            status,
            body: vec![body.to_string()],
            hold_open: None,
        }
    }
}

/// Serve a single request. Returns the base URL and a handle resolving to the raw request.
pub async fn serve_once(response: StubResponse) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;

        let head = format!(
            "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nConnection: close\r\n\r\n",
            response.status
        );
        socket.write_all(head.as_bytes()).await.unwrap();
        for part in &response.body {
            socket.write_all(part.as_bytes()).await.unwrap();
            socket.flush().await.unwrap();
        }

        if let Some(hold) = response.hold_open {
            tokio::time::sleep(hold).await;
        }
        let _ = socket.shutdown().await;

        request
    });

    (format!("http://{addr}"), handle)
}

/// URL of a local port with nothing listening on it
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];

    loop {
        let n = socket.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);

        let text = String::from_utf8_lossy(&data);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);

            if data.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&data).into_owned()
}
