//! Minimal HTTP/1.1 server standing in for the catalog API and the file host.
//!
//! POST to any path answers with the configured catalog JSON. GET serves static files by
//! path, or 404. Every POST body is recorded for assertions.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// How the server answers catalog POSTs.
#[derive(Debug, Clone)]
pub enum CatalogReply {
    /// A well-formed details response; `file_path` is served by this same server.
    Found { filename: String, file_path: String },
    /// A raw body, sent as-is with 200.
    Raw(String),
}

pub struct CatalogServer {
    /// e.g. "http://127.0.0.1:12345"
    pub base_url: String,
    posts: Arc<Mutex<Vec<String>>>,
}

impl CatalogServer {
    pub fn catalog_url(&self) -> String {
        format!("{}/ISteamRemoteStorage/GetPublishedFileDetails/v1/", self.base_url)
    }

    pub fn posts(&self) -> Vec<String> {
        self.posts.lock().unwrap().clone()
    }
}

/// Starts the server on a background thread; it runs until the process exits.
pub fn start(catalog: CatalogReply, files: HashMap<String, Vec<u8>>) -> CatalogServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let base_url = format!("http://127.0.0.1:{}", port);
    let posts = Arc::new(Mutex::new(Vec::new()));

    let catalog_body = Arc::new(match catalog {
        CatalogReply::Found {
            filename,
            file_path,
        } => format!(
            r#"{{"response":{{"result":1,"resultcount":1,"publishedfiledetails":[{{"publishedfileid":"12345","result":1,"filename":"{}","file_url":"{}{}","file_size":"{}","title":"Test map"}}]}}}}"#,
            filename,
            base_url,
            file_path,
            files.get(&file_path).map_or(0, |b| b.len())
        ),
        CatalogReply::Raw(body) => body,
    });
    let files = Arc::new(files);
    let recorded = Arc::clone(&posts);

    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let catalog_body = Arc::clone(&catalog_body);
            let files = Arc::clone(&files);
            let recorded = Arc::clone(&recorded);
            thread::spawn(move || handle(stream, &catalog_body, &files, &recorded));
        }
    });

    CatalogServer { base_url, posts }
}

fn handle(
    mut stream: TcpStream,
    catalog_body: &str,
    files: &HashMap<String, Vec<u8>>,
    posts: &Mutex<Vec<String>>,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let (method, path, body) = match read_request(&mut stream) {
        Some(r) => r,
        None => return,
    };

    if method.eq_ignore_ascii_case("POST") {
        posts.lock().unwrap().push(body);
        respond(&mut stream, "200 OK", "application/json", catalog_body.as_bytes());
        return;
    }
    if method.eq_ignore_ascii_case("GET") {
        match files.get(&path) {
            Some(bytes) => respond(&mut stream, "200 OK", "application/octet-stream", bytes),
            None => respond(&mut stream, "404 Not Found", "text/plain", b"not found"),
        }
        return;
    }
    respond(&mut stream, "405 Method Not Allowed", "text/plain", b"");
}

fn respond(stream: &mut TcpStream, status: &str, content_type: &str, body: &[u8]) {
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        content_type,
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}

/// Reads one request; returns (method, path, body).
fn read_request(stream: &mut TcpStream) -> Option<(String, String, String)> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = std::str::from_utf8(&buf[..header_end]).ok()?.to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let content_length = lines
        .filter_map(|l| l.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let end = buf.len().min(header_end + content_length);
    let body = String::from_utf8_lossy(&buf[header_end..end]).into_owned();
    Some((method, path, body))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
