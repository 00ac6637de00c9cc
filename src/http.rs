use std::io::Read;
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("storyreel/", env!("CARGO_PKG_VERSION"));
const MAX_BODY_BYTES: u64 = 32 * 1024 * 1024;

#[derive(Debug, Error)]
pub(crate) enum HttpError {
    #[error("HTTP status {status}{}", body_suffix(.body))]
    Status { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("response decode failed: {0}")]
    Decode(String),

    #[error("request failed after {attempts} attempt(s): {last}")]
    Exhausted { attempts: usize, last: Box<HttpError> },
}

fn body_suffix(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(" ({body})")
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct FetchPolicy {
    pub(crate) connect_timeout: Duration,
    pub(crate) read_timeout: Duration,
    pub(crate) attempts: usize,
    pub(crate) retry_delay: Duration,
}

impl FetchPolicy {
    /// Catalog documents: a few attempts with a short pause between them.
    pub(crate) fn catalog() -> Self {
        Self {
            connect_timeout: Duration::from_secs(3),
            read_timeout: Duration::from_secs(10),
            attempts: 3,
            retry_delay: Duration::from_millis(500),
        }
    }

    /// Story media: exactly one attempt, failures surface as a fallback image.
    pub(crate) fn media() -> Self {
        Self {
            connect_timeout: Duration::from_secs(3),
            read_timeout: Duration::from_secs(15),
            attempts: 1,
            retry_delay: Duration::ZERO,
        }
    }
}

fn should_retry_http_status(status: u16) -> bool {
    status == 408 || status == 429 || (500..=599).contains(&status)
}

/// Reads at most `limit` bytes; a longer body is an error, never a silent truncation.
fn read_limited_body(reader: impl Read, limit: u64) -> Result<Vec<u8>, HttpError> {
    let mut body = Vec::new();
    reader
        .take(limit.saturating_add(1))
        .read_to_end(&mut body)
        .map_err(|err| HttpError::Decode(err.to_string()))?;
    if body.len() as u64 > limit {
        return Err(HttpError::Decode(format!("response exceeds {limit} byte limit")));
    }
    Ok(body)
}

pub(crate) fn get_text_with_retries(url: &str, policy: &FetchPolicy) -> Result<String, HttpError> {
    let bytes = get_bytes_with_retries(url, policy)?;
    String::from_utf8(bytes).map_err(|err| HttpError::Decode(err.to_string()))
}

pub(crate) fn get_bytes_with_retries(url: &str, policy: &FetchPolicy) -> Result<Vec<u8>, HttpError> {
    let attempts = policy.attempts.max(1);
    let agent = ureq::AgentBuilder::new()
        .timeout_connect(policy.connect_timeout)
        .timeout_read(policy.read_timeout)
        .timeout_write(policy.read_timeout)
        .user_agent(USER_AGENT)
        .build();

    let mut last_error = None;
    for attempt in 1..=attempts {
        debug!(url, attempt, "GET");
        let err = match agent.get(url).call() {
            Ok(response) => {
                return read_limited_body(response.into_reader(), MAX_BODY_BYTES);
            }
            Err(ureq::Error::Status(status, response)) => {
                let response_body = response.into_string().ok().unwrap_or_default();
                let body = response_body.trim().chars().take(240).collect::<String>();
                let err = HttpError::Status { status, body };
                if !should_retry_http_status(status) {
                    return Err(err);
                }
                err
            }
            Err(ureq::Error::Transport(err)) => HttpError::Transport(err.to_string()),
        };

        if attempt < attempts {
            warn!(url, attempt, error = %err, "request failed, retrying");
            thread::sleep(policy.retry_delay);
        }
        last_error = Some(err);
    }

    let last = last_error.unwrap_or_else(|| {
        HttpError::Transport("exhausted attempts without a concrete error".to_string())
    });
    if attempts == 1 {
        return Err(last);
    }
    Err(HttpError::Exhausted {
        attempts,
        last: Box::new(last),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io::Write;
    use std::net::{TcpListener, TcpStream};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone)]
    enum Behavior {
        Respond(u16, String),
        DelayRespond(Duration, u16, String),
    }

    #[derive(Debug)]
    struct TestServer {
        base_url: String,
        requests: Arc<AtomicUsize>,
        shutdown_tx: mpsc::Sender<()>,
        join_handle: Option<std::thread::JoinHandle<()>>,
    }

    impl TestServer {
        fn spawn(behaviors: Vec<Behavior>) -> Self {
            let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind test server");
            listener.set_nonblocking(true).expect("set nonblocking");
            let addr = listener.local_addr().expect("local addr");

            let requests = Arc::new(AtomicUsize::new(0));
            let requests_clone = Arc::clone(&requests);
            let behaviors = Arc::new(Mutex::new(VecDeque::from(behaviors)));
            let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

            let join_handle = std::thread::spawn(move || {
                loop {
                    if shutdown_rx.try_recv().is_ok() {
                        break;
                    }

                    match listener.accept() {
                        Ok((mut stream, _)) => {
                            requests_clone.fetch_add(1, Ordering::SeqCst);
                            let behavior = {
                                let mut queue = behaviors.lock().expect("lock behaviors");
                                queue.pop_front().unwrap_or_else(|| {
                                    Behavior::Respond(200, "default-ok".to_string())
                                })
                            };
                            std::thread::spawn(move || {
                                let _ = consume_request(&mut stream);
                                serve_behavior(&mut stream, behavior);
                            });
                        }
                        Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                            std::thread::sleep(Duration::from_millis(5));
                        }
                        Err(_) => break,
                    }
                }
            });

            Self {
                base_url: format!("http://{addr}"),
                requests,
                shutdown_tx,
                join_handle: Some(join_handle),
            }
        }

        fn request_count(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }
    }

    impl Drop for TestServer {
        fn drop(&mut self) {
            let _ = self.shutdown_tx.send(());
            if let Some(handle) = self.join_handle.take() {
                let _ = handle.join();
            }
        }
    }

    fn consume_request(stream: &mut TcpStream) -> std::io::Result<()> {
        stream.set_read_timeout(Some(Duration::from_millis(200)))?;
        let mut buf = [0_u8; 1024];
        let mut data = Vec::new();
        loop {
            match stream.read(&mut buf) {
                Ok(0) => break,
                Ok(read) => {
                    data.extend_from_slice(&buf[..read]);
                    if data.windows(4).any(|window| window == b"\r\n\r\n") {
                        break;
                    }
                }
                Err(err)
                    if err.kind() == std::io::ErrorKind::WouldBlock
                        || err.kind() == std::io::ErrorKind::TimedOut =>
                {
                    break;
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    fn serve_behavior(stream: &mut TcpStream, behavior: Behavior) {
        match behavior {
            Behavior::Respond(status, body) => {
                let _ = write_response(stream, status, &body);
            }
            Behavior::DelayRespond(delay, status, body) => {
                std::thread::sleep(delay);
                let _ = write_response(stream, status, &body);
            }
        }
    }

    fn write_response(stream: &mut TcpStream, status: u16, body: &str) -> std::io::Result<()> {
        let payload = body.as_bytes();
        write!(
            stream,
            "HTTP/1.1 {status} Status\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            payload.len()
        )?;
        stream.write_all(payload)?;
        stream.flush()
    }

    fn quick_policy(attempts: usize) -> FetchPolicy {
        FetchPolicy {
            connect_timeout: Duration::from_millis(200),
            read_timeout: Duration::from_millis(200),
            attempts,
            retry_delay: Duration::from_millis(1),
        }
    }

    #[test]
    fn retries_retryable_statuses_until_success() {
        let server = TestServer::spawn(vec![
            Behavior::Respond(500, "server-error".to_string()),
            Behavior::Respond(429, "throttled".to_string()),
            Behavior::Respond(200, "[]".to_string()),
        ]);

        let body = get_text_with_retries(&server.base_url, &quick_policy(3))
            .expect("should eventually succeed");

        assert_eq!(body, "[]");
        assert_eq!(server.request_count(), 3);
    }

    #[test]
    fn does_not_retry_hard_client_errors() {
        let server = TestServer::spawn(vec![Behavior::Respond(404, "not-found".to_string())]);

        let err = get_text_with_retries(&server.base_url, &quick_policy(5))
            .expect_err("404 should not be retried");

        assert!(
            err.to_string().contains("HTTP status 404 (not-found)"),
            "unexpected error message: {err}"
        );
        assert_eq!(server.request_count(), 1);
    }

    #[test]
    fn retries_transport_timeout_and_recovers() {
        let server = TestServer::spawn(vec![
            Behavior::DelayRespond(Duration::from_millis(120), 200, "slow".to_string()),
            Behavior::Respond(200, "ok".to_string()),
        ]);
        let policy = FetchPolicy {
            connect_timeout: Duration::from_millis(250),
            read_timeout: Duration::from_millis(20),
            attempts: 2,
            retry_delay: Duration::from_millis(1),
        };

        let body = get_text_with_retries(&server.base_url, &policy).expect("timeout should be retried");

        assert_eq!(body, "ok");
        assert_eq!(server.request_count(), 2);
    }

    #[test]
    fn reports_exhausted_attempts_for_retryable_status() {
        let server = TestServer::spawn(vec![
            Behavior::Respond(503, "down".to_string()),
            Behavior::Respond(503, "still-down".to_string()),
        ]);

        let err = get_text_with_retries(&server.base_url, &quick_policy(2))
            .expect_err("retryable failures should eventually error");

        let message = err.to_string();
        assert!(
            message.contains("after 2 attempt(s)") && message.contains("HTTP status 503"),
            "unexpected error message: {message}"
        );
        assert_eq!(server.request_count(), 2);
    }

    #[test]
    fn media_policy_never_retries() {
        let server = TestServer::spawn(vec![
            Behavior::Respond(503, "down".to_string()),
            Behavior::Respond(200, "late".to_string()),
        ]);
        let policy = FetchPolicy {
            connect_timeout: Duration::from_millis(200),
            read_timeout: Duration::from_millis(200),
            ..FetchPolicy::media()
        };

        let err = get_bytes_with_retries(&server.base_url, &policy).expect_err("single attempt");

        assert!(matches!(err, HttpError::Status { status: 503, .. }));
        assert_eq!(server.request_count(), 1);
    }

    #[test]
    fn body_at_the_limit_is_returned_whole() {
        let body = read_limited_body(&b"12345678"[..], 8).expect("body fits the limit");
        assert_eq!(body, b"12345678");
    }

    #[test]
    fn body_over_the_limit_is_rejected() {
        let err = read_limited_body(&b"123456789"[..], 8).expect_err("body is one byte too long");
        assert!(
            matches!(&err, HttpError::Decode(message) if message.contains("exceeds 8 byte limit")),
            "unexpected error: {err}"
        );
    }
}
