#[cfg(test)]
use crate::core::ai_client::ChatCompletion;
#[cfg(test)]
use crate::core::app::{App, Services};
#[cfg(test)]
use crate::core::credentials::CredentialStore;
#[cfg(test)]
use crate::core::papers::PaperLookup;
#[cfg(test)]
use crate::core::session::Session;
#[cfg(test)]
use crate::core::transcript::Transcript;
#[cfg(test)]
use std::sync::{Arc, Mutex};
#[cfg(test)]
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
#[cfg(test)]
use tokio::net::{TcpListener, TcpStream};
#[cfg(test)]
use tokio::task::JoinHandle;

#[cfg(test)]
pub struct StubResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

#[cfg(test)]
impl StubResponse {
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.to_string(),
        }
    }

    pub fn xml(body: &str) -> Self {
        Self {
            status: 200,
            content_type: "application/atom+xml",
            body: body.to_string(),
        }
    }
}

#[cfg(test)]
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

#[cfg(test)]
impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Serve one canned response per accepted connection, in order, and hand
/// back the captured requests once all of them were answered.
#[cfg(test)]
pub async fn spawn_stub_server(
    responses: Vec<StubResponse>,
) -> (String, JoinHandle<Vec<CapturedRequest>>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("local addr should resolve");

    let handle = tokio::spawn(async move {
        let mut captured = Vec::new();
        for response in responses {
            let (mut stream, _) = listener.accept().await.expect("accept should succeed");
            let request = read_http_request(&mut stream)
                .await
                .expect("request should parse");
            captured.push(request);

            let reply = format!(
                "HTTP/1.1 {} Stub\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                response.status,
                response.content_type,
                response.body.len(),
                response.body
            );
            stream
                .write_all(reply.as_bytes())
                .await
                .expect("response should write");
            let _ = stream.shutdown().await;
        }
        captured
    });

    (format!("http://{addr}"), handle)
}

/// A base URL nothing is listening on.
#[cfg(test)]
pub async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("local addr should resolve");
    drop(listener);
    format!("http://{addr}")
}

/// Read one request: request line, headers up to the blank line, then exactly
/// `Content-Length` body bytes. Early EOF anywhere is an error.
#[cfg(test)]
async fn read_http_request(stream: &mut TcpStream) -> Result<CapturedRequest, String> {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    reader
        .read_line(&mut request_line)
        .await
        .map_err(|err| err.to_string())?;
    if request_line.is_empty() {
        return Err("Connection closed before the request line".to_string());
    }

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        let read = reader
            .read_line(&mut line)
            .await
            .map_err(|err| err.to_string())?;
        if read == 0 {
            return Err("Unexpected EOF while reading HTTP headers".to_string());
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.to_string(), value.trim().to_string()));
        }
    }

    let content_length = headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .map(|(_, value)| value.parse::<usize>())
        .transpose()
        .map_err(|err| err.to_string())?
        .unwrap_or(0);

    let mut body = vec![0_u8; content_length];
    reader
        .read_exact(&mut body)
        .await
        .map_err(|err| format!("Request body shorter than {content_length} bytes: {err}"))?;

    Ok(CapturedRequest {
        request_line: request_line.trim_end().to_string(),
        headers,
        body,
    })
}

/// Canned completion that records every (prompt, context) pair it sees.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingCompletion {
    pub reply: String,
    pub calls: Mutex<Vec<(String, String)>>,
}

#[cfg(test)]
impl RecordingCompletion {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait::async_trait]
impl ChatCompletion for RecordingCompletion {
    async fn query(&self, prompt: &str, context: &str) -> String {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), context.to_string()));
        self.reply.clone()
    }
}

#[cfg(test)]
pub fn create_test_app(ai: Arc<dyn ChatCompletion>, papers_url: &str) -> App {
    App {
        session: Session::default(),
        transcript: Transcript::new(),
        credentials: CredentialStore::in_memory(),
        services: Services {
            ai,
            papers: PaperLookup::new(reqwest::Client::new(), papers_url),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn read_raw(raw: &'static [u8]) -> Result<CapturedRequest, String> {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            stream.write_all(raw).await.unwrap();
            stream.shutdown().await.unwrap();
        });

        let (mut stream, _) = listener.accept().await.unwrap();
        let request = read_http_request(&mut stream).await;
        client.await.unwrap();
        request
    }

    #[tokio::test]
    async fn reads_headers_and_exact_body() {
        let request = read_raw(
            b"POST /v1/chat/completions HTTP/1.1\r\nContent-Length: 2\r\nX-Test: yes\r\n\r\n{}",
        )
        .await
        .unwrap();

        assert_eq!(request.request_line, "POST /v1/chat/completions HTTP/1.1");
        assert_eq!(request.header("x-test"), Some("yes"));
        assert_eq!(request.body, b"{}");
    }

    #[tokio::test]
    async fn short_body_is_rejected() {
        let err = read_raw(b"POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc")
            .await
            .unwrap_err();
        assert!(err.starts_with("Request body shorter than 10 bytes"), "{err}");
    }

    #[tokio::test]
    async fn eof_inside_headers_is_rejected() {
        let err = read_raw(b"GET / HTTP/1.1\r\nHost: localhost\r\n")
            .await
            .unwrap_err();
        assert_eq!(err, "Unexpected EOF while reading HTTP headers");
    }
}
