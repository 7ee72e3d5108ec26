//! Mock expense backend for testing
//!
//! A small HTTP/1.1 server on a background thread that answers from a
//! list of canned routes and records every request it receives, so tests
//! can assert on exactly what went over the wire (headers, query string,
//! JSON body).
//!
//! Routes are matched on method and path (query string ignored). A route
//! marked `once()` is consumed by its first match, which lets a test
//! script "fail, then succeed" on the same endpoint.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// One canned response
#[derive(Debug, Clone)]
pub struct MockRoute {
    pub method: String,
    pub path: String,
    pub status: u16,
    pub body: String,
    pub delay_ms: u64,
    once: bool,
}

impl MockRoute {
    pub fn json(method: &str, path: &str, status: u16, body: &str) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
            status,
            body: body.to_string(),
            delay_ms: 0,
            once: false,
        }
    }

    /// Consume this route after its first match
    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }

    pub fn delayed(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

/// A request as the server saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path including any query string
    pub target: String,
    /// Header names lower-cased
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or(&self.target)
    }

    pub fn query(&self) -> Option<&str> {
        self.target.split_once('?').map(|(_, q)| q)
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap_or(serde_json::Value::Null)
    }
}

/// Mock backend server for testing
pub struct MockApiServer {
    port: u16,
    running: Arc<AtomicBool>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl MockApiServer {
    /// Start a new mock server on a random available port
    pub fn start(routes: Vec<MockRoute>) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let requests = Arc::new(Mutex::new(Vec::new()));
        let routes = Arc::new(Mutex::new(routes));

        // Non-blocking so the accept loop can notice shutdown
        listener.set_nonblocking(true)?;

        let running_clone = running.clone();
        let requests_clone = requests.clone();
        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let routes = routes.clone();
                        let requests = requests_clone.clone();
                        thread::spawn(move || {
                            handle_connection(stream, &routes, &requests);
                        });
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(Duration::from_millis(5));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            requests,
            thread_handle: Some(thread_handle),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Base URL for this mock server
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Requests received so far, in arrival order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Requests received for one method and path
    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path() == path)
            .collect()
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockApiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn handle_connection(
    mut stream: TcpStream,
    routes: &Mutex<Vec<MockRoute>>,
    requests: &Mutex<Vec<RecordedRequest>>,
) {
    let _ = stream.set_nonblocking(false);
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));

    let Some(request) = read_request(&mut stream) else {
        send_response(&mut stream, 400, r#"{"message": "Bad request"}"#);
        return;
    };

    let route = take_route(routes, &request.method, request.path());
    if let Ok(mut log) = requests.lock() {
        log.push(request);
    }

    match route {
        Some(route) => {
            if route.delay_ms > 0 {
                thread::sleep(Duration::from_millis(route.delay_ms));
            }
            send_response(&mut stream, route.status, &route.body);
        }
        None => send_response(&mut stream, 404, r#"{"message": "Endpoint not found"}"#),
    }
}

fn take_route(routes: &Mutex<Vec<MockRoute>>, method: &str, path: &str) -> Option<MockRoute> {
    let mut routes = routes.lock().ok()?;
    let index = routes
        .iter()
        .position(|r| r.method == method && r.path == path)?;
    if routes[index].once {
        Some(routes.remove(index))
    } else {
        Some(routes[index].clone())
    }
}

fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut data = Vec::new();
    let mut buffer = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buffer[..n]);
        if let Some(pos) = find_header_end(&data) {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&data[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();

    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k == "content-length")
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    let body_start = header_end + 4;
    while data.len() < body_start + content_length {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buffer[..n]);
    }
    let body_end = (body_start + content_length).min(data.len());
    let body = String::from_utf8_lossy(&data[body_start..body_end]).to_string();

    Some(RecordedRequest {
        method,
        target,
        headers,
        body,
    })
}

fn find_header_end(data: &[u8]) -> Option<usize> {
    data.windows(4).position(|w| w == b"\r\n\r\n")
}

fn send_response(stream: &mut TcpStream, status: u16, body: &str) {
    let status_text = match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        409 => "Conflict",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        _ => "Status",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_server_starts() {
        let server = MockApiServer::start(Vec::new()).unwrap();
        assert!(server.port() > 0);
        assert!(server.requests().is_empty());
    }

    #[test]
    fn test_once_route_is_consumed() {
        let routes = Mutex::new(vec![
            MockRoute::json("POST", "/expenses", 500, "{}").once(),
            MockRoute::json("POST", "/expenses", 201, "{}"),
        ]);
        assert_eq!(take_route(&routes, "POST", "/expenses").unwrap().status, 500);
        assert_eq!(take_route(&routes, "POST", "/expenses").unwrap().status, 201);
        assert_eq!(take_route(&routes, "POST", "/expenses").unwrap().status, 201);
        assert!(take_route(&routes, "GET", "/expenses").is_none());
    }

    #[test]
    fn test_recorded_request_accessors() {
        let request = RecordedRequest {
            method: "GET".to_string(),
            target: "/expenses?category=Travel&sort=date_asc".to_string(),
            headers: vec![("authorization".to_string(), "Bearer t".to_string())],
            body: String::new(),
        };
        assert_eq!(request.path(), "/expenses");
        assert_eq!(request.query(), Some("category=Travel&sort=date_asc"));
        assert_eq!(request.header("Authorization"), Some("Bearer t"));
    }
}
