//! Local upload page for documenting one file at a time.
//!
//! Each browser gets a session cookie. Uploads and resets replace that
//! session's value wholesale; requests are handled on their own thread with
//! their own parser.

use crate::config::Config;
use crate::documenter::Documenter;
use crate::error::{Error, Result};
use crate::output::HtmlRenderer;
use crate::session::{Session, Upload};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

const SESSION_COOKIE: &str = "codexplain_session";
const MAX_HEADER_BYTES: usize = 16 * 1024;

/// Session values keyed by cookie id.
///
/// Holds at most `capacity` sessions; storing a new one beyond that drops
/// the session that was least recently read or written.
#[derive(Debug)]
pub struct SessionStore {
    slots: Mutex<Slots>,
    capacity: usize,
    counter: AtomicU64,
}

#[derive(Debug, Default)]
struct Slots {
    map: HashMap<String, Slot>,
    clock: u64,
}

#[derive(Debug)]
struct Slot {
    session: Arc<Session>,
    touched: u64,
}

impl Slots {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

impl SessionStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Mutex::new(Slots::default()),
            capacity: capacity.max(1),
            counter: AtomicU64::new(0),
        }
    }

    /// Current value of a session; unknown ids are empty sessions
    pub fn get(&self, id: &str) -> Arc<Session> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let now = slots.tick();
        match slots.map.get_mut(id) {
            Some(slot) => {
                slot.touched = now;
                Arc::clone(&slot.session)
            }
            None => Arc::default(),
        }
    }

    /// Swap in a new value for a session
    pub fn replace(&self, id: &str, session: Session) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);

        if !slots.map.contains_key(id) && slots.map.len() >= self.capacity {
            let oldest = slots
                .map
                .iter()
                .min_by_key(|(_, slot)| slot.touched)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                slots.map.remove(&oldest);
                tracing::debug!("Evicted idle session");
            }
        }

        let touched = slots.tick();
        slots.map.insert(
            id.to_string(),
            Slot {
                session: Arc::new(session),
                touched,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.slots.lock().map(|s| s.map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fresh, hard to guess session id
    pub fn new_id(&self) -> String {
        let count = self.counter.fetch_add(1, Ordering::Relaxed);
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);

        let mut hasher = Sha256::new();
        hasher.update(count.to_le_bytes());
        hasher.update(nanos.to_le_bytes());
        hasher.update(std::process::id().to_le_bytes());
        let digest = hasher.finalize();

        digest.iter().take(16).map(|b| format!("{:02x}", b)).collect()
    }
}

/// Shared server state
pub struct App {
    config: Config,
    html: HtmlRenderer,
    sessions: SessionStore,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let html = HtmlRenderer::new(&config.output)?;
        let sessions = SessionStore::new(config.server.max_sessions);
        Ok(Self {
            config,
            html,
            sessions,
        })
    }
}

/// Bind to localhost and serve until the process is stopped
pub fn serve(config: Config, port: u16) -> Result<()> {
    let listener = TcpListener::bind(("127.0.0.1", port))
        .map_err(|e| Error::Other(format!("Failed to bind to port {}: {}", port, e)))?;
    let app = Arc::new(App::new(config)?);
    run(listener, app)
}

/// Accept connections, one thread per connection
pub fn run(listener: TcpListener, app: Arc<App>) -> Result<()> {
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let app = Arc::clone(&app);
                std::thread::spawn(move || {
                    if let Err(e) = handle_connection(stream, &app) {
                        tracing::warn!(error = %e, "Request error");
                    }
                });
            }
            Err(e) => tracing::warn!(error = %e, "Connection error"),
        }
    }

    Ok(())
}

/// A parsed HTTP request
#[derive(Debug, Clone, PartialEq)]
struct Request {
    method: String,
    path: String,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl Request {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    fn session_id(&self) -> Option<String> {
        self.header("cookie").and_then(session_from_cookie)
    }
}

enum Incoming {
    Request(Request),
    TooLarge,
    Malformed,
}

fn handle_connection(mut stream: TcpStream, app: &App) -> Result<()> {
    let request = match read_request(&mut stream, app.config.server.max_upload_bytes)? {
        Incoming::Request(request) => request,
        Incoming::TooLarge => {
            tracing::info!("413 upload too large");
            return send_response(&mut stream, 413, "Payload Too Large", "text/plain", &[], b"Upload too large");
        }
        Incoming::Malformed => {
            return send_response(&mut stream, 400, "Bad Request", "text/plain", &[], b"Bad Request");
        }
    };

    let (id, is_new) = match request.session_id() {
        Some(id) => (id, false),
        None => (app.sessions.new_id(), true),
    };
    let mut headers = Vec::new();
    if is_new {
        headers.push((
            "Set-Cookie",
            format!("{}={}; Path=/; HttpOnly; SameSite=Strict", SESSION_COOKIE, id),
        ));
    }

    let status = match (request.method.as_str(), request.path.as_str()) {
        ("GET", "/") => {
            let session = app.sessions.get(&id);
            let page = app.html.render_page(&session, app.config.server.max_upload_bytes)?;
            send_response(&mut stream, 200, "OK", "text/html; charset=utf-8", &headers, page.as_bytes())?;
            200
        }
        ("POST", "/analyze") => {
            let session = document_upload(&request, &app.config)?;
            app.sessions.replace(&id, session);
            send_response(&mut stream, 204, "No Content", "text/plain", &headers, b"")?;
            204
        }
        ("POST", "/reset") => {
            app.sessions.replace(&id, Session::reset());
            send_response(&mut stream, 204, "No Content", "text/plain", &headers, b"")?;
            204
        }
        ("GET", _) => {
            send_response(&mut stream, 404, "Not Found", "text/plain", &headers, b"Not Found")?;
            404
        }
        _ => {
            send_response(&mut stream, 405, "Method Not Allowed", "text/plain", &headers, b"Method Not Allowed")?;
            405
        }
    };

    tracing::info!("{} {} {}", status, request.method, request.path);
    Ok(())
}

/// Build the new session value for an upload request
fn document_upload(request: &Request, config: &Config) -> Result<Session> {
    let filename = request
        .header("x-filename")
        .map(percent_decode)
        .filter(|name| !name.is_empty());

    let upload = if request.body.is_empty() && filename.is_none() {
        None
    } else {
        Some(Upload::new(filename, request.body.clone()))
    };

    let mut documenter = Documenter::new(config)?;
    Ok(Session::from_upload(upload, &mut documenter))
}

fn read_request(stream: &mut TcpStream, max_body: usize) -> Result<Incoming> {
    let mut buffer = Vec::new();
    let mut chunk = [0; 4096];

    let header_end = loop {
        if let Some(pos) = find_header_end(&buffer) {
            break pos;
        }
        if buffer.len() > MAX_HEADER_BYTES {
            return Ok(Incoming::Malformed);
        }
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            return Ok(Incoming::Malformed);
        }
        buffer.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let Some((method, path, headers)) = parse_head(&head) else {
        return Ok(Incoming::Malformed);
    };

    let content_length = headers
        .get("content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);
    if content_length > max_body {
        return Ok(Incoming::TooLarge);
    }

    let mut body = buffer[header_end + 4..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }
    body.truncate(content_length);

    Ok(Incoming::Request(Request {
        method,
        path,
        headers,
        body,
    }))
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Parse the request line and headers; header names are lowercased
fn parse_head(head: &str) -> Option<(String, String, HashMap<String, String>)> {
    let mut lines = head.split("\r\n");
    let request_line = lines.next()?;
    let parts: Vec<&str> = request_line.split_whitespace().collect();
    if parts.len() < 2 {
        return None;
    }

    let method = parts[0].to_string();
    // Drop the query string
    let path = parts[1].split('?').next().unwrap_or(parts[1]).to_string();

    let headers = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_string()))
        .collect();

    Some((method, path, headers))
}

fn session_from_cookie(cookie: &str) -> Option<String> {
    cookie
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// Decode percent-encoded UTF-8
fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(byte) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                decoded.push(byte);
                i += 3;
                continue;
            }
        }
        decoded.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&decoded).into_owned()
}

/// Send an HTTP response
fn send_response(
    stream: &mut TcpStream,
    status_code: u16,
    status_text: &str,
    content_type: &str,
    extra_headers: &[(&str, String)],
    body: &[u8],
) -> Result<()> {
    let mut response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        status_code,
        status_text,
        content_type,
        body.len()
    );
    for (name, value) in extra_headers {
        response.push_str(&format!("{}: {}\r\n", name, value));
    }
    response.push_str("\r\n");

    stream.write_all(response.as_bytes())?;
    stream.write_all(body)?;
    stream.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_head() {
        let head = "POST /analyze?x=1 HTTP/1.1\r\nHost: localhost\r\nX-Filename: demo.py\r\nContent-Length: 9";
        let (method, path, headers) = parse_head(head).unwrap();
        assert_eq!(method, "POST");
        assert_eq!(path, "/analyze");
        assert_eq!(headers.get("x-filename").map(String::as_str), Some("demo.py"));
        assert_eq!(headers.get("content-length").map(String::as_str), Some("9"));
    }

    #[test]
    fn test_parse_head_malformed() {
        assert!(parse_head("GARBAGE").is_none());
    }

    #[test]
    fn test_session_from_cookie() {
        assert_eq!(
            session_from_cookie("theme=dark; codexplain_session=abc123"),
            Some("abc123".to_string())
        );
        assert_eq!(session_from_cookie("theme=dark"), None);
        assert_eq!(session_from_cookie("codexplain_session="), None);
    }

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("my%20file.py"), "my file.py");
        assert_eq!(percent_decode("caf%C3%A9.py"), "café.py");
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz"), "%zz");
    }

    #[test]
    fn test_session_ids_are_unique() {
        let store = SessionStore::new(8);
        let a = store.new_id();
        let b = store.new_id();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }

    #[test]
    fn test_store_replaces_wholesale() {
        let store = SessionStore::new(8);
        assert!(store.get("s1").is_empty());

        store.replace("s1", Session::Failed { message: "boom".into() });
        let before = store.get("s1");
        store.replace("s1", Session::reset());

        // values handed out earlier are untouched
        assert!(matches!(*before, Session::Failed { .. }));
        assert!(store.get("s1").is_empty());
        assert!(store.get("s2").is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_evicts_least_recently_used() {
        let store = SessionStore::new(2);
        store.replace("a", Session::Failed { message: "a".into() });
        store.replace("b", Session::Failed { message: "b".into() });

        // reading `a` makes `b` the oldest
        assert!(!store.get("a").is_empty());
        store.replace("c", Session::Failed { message: "c".into() });

        assert_eq!(store.len(), 2);
        assert!(!store.get("a").is_empty());
        assert!(store.get("b").is_empty());
        assert!(!store.get("c").is_empty());
    }

    #[test]
    fn test_store_replacing_existing_does_not_evict() {
        let store = SessionStore::new(1);
        store.replace("a", Session::Failed { message: "first".into() });
        store.replace("a", Session::reset());
        assert_eq!(store.len(), 1);
        assert!(store.get("a").is_empty());
    }

    #[test]
    fn test_uploads_without_cookie_stay_bounded() {
        let mut config = Config::default();
        config.server.max_sessions = 3;
        let app = App::new(config).unwrap();

        for i in 0..10 {
            let id = app.sessions.new_id();
            app.sessions.replace(&id, Session::Failed { message: i.to_string() });
        }
        assert_eq!(app.sessions.len(), 3);
    }

    fn request(addr: std::net::SocketAddr, raw: &str) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(raw.as_bytes()).unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();
        response
    }

    fn start_server(config: Config) -> std::net::SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Arc::new(App::new(config).unwrap());
        std::thread::spawn(move || run(listener, app));
        addr
    }

    #[test]
    fn test_upload_then_page_then_reset() {
        let addr = start_server(Config::default());
        let cookie = "Cookie: codexplain_session=test-session\r\n";

        let source = "import os\n";
        let upload = format!(
            "POST /analyze HTTP/1.1\r\nHost: localhost\r\n{}X-Filename: demo.py\r\nContent-Length: {}\r\n\r\n{}",
            cookie,
            source.len(),
            source
        );
        assert!(request(addr, &upload).starts_with("HTTP/1.1 204"));

        let page = request(addr, &format!("GET / HTTP/1.1\r\nHost: localhost\r\n{}\r\n", cookie));
        assert!(page.starts_with("HTTP/1.1 200"));
        assert!(page.contains("<code>demo.py</code>"));
        assert!(page.contains("<h2>Imports</h2>"));

        let reset = format!("POST /reset HTTP/1.1\r\nHost: localhost\r\n{}Content-Length: 0\r\n\r\n", cookie);
        assert!(request(addr, &reset).starts_with("HTTP/1.1 204"));

        let page = request(addr, &format!("GET / HTTP/1.1\r\nHost: localhost\r\n{}\r\n", cookie));
        assert!(!page.contains("demo.py"));
    }

    #[test]
    fn test_new_visitor_gets_cookie() {
        let addr = start_server(Config::default());
        let page = request(addr, "GET / HTTP/1.1\r\nHost: localhost\r\n\r\n");
        assert!(page.contains("Set-Cookie: codexplain_session="));
    }

    #[test]
    fn test_upload_too_large() {
        let mut config = Config::default();
        config.server.max_upload_bytes = 4;
        let addr = start_server(config);
        // body never sent; the limit is checked against Content-Length
        let raw = "POST /analyze HTTP/1.1\r\nContent-Length: 10\r\n\r\n";
        assert!(request(addr, raw).starts_with("HTTP/1.1 413"));
    }

    #[test]
    fn test_unknown_path() {
        let addr = start_server(Config::default());
        assert!(request(addr, "GET /missing HTTP/1.1\r\n\r\n").starts_with("HTTP/1.1 404"));
        assert!(request(addr, "DELETE / HTTP/1.1\r\n\r\n").starts_with("HTTP/1.1 405"));
    }
}
