#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use filedrop::config::{Config, Credentials};
use filedrop::server::AppContext;
use filedrop::server::connection::Connection;
use tempfile::TempDir;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub const BOUNDARY: &str = "XYZ";

pub struct TestServer {
    pub dir: TempDir,
    pub ctx: Arc<AppContext>,
}

impl TestServer {
    pub fn web_root(&self) -> PathBuf {
        self.dir.path().join("www")
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.ctx.storage.dir().to_path_buf()
    }

    pub fn stored_names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.upload_dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Runs one request through a `Connection` over an in-memory pipe.
    pub async fn send(&self, request: &[u8]) -> RawResponse {
        let (client, server) = tokio::io::duplex(1 << 20);
        let ctx = Arc::clone(&self.ctx);
        let handle = tokio::spawn(async move {
            let mut conn = Connection::new(server, ctx);
            conn.run().await
        });

        let response = exchange(client, request).await;
        let _ = handle.await.unwrap();
        response
    }
}

pub async fn setup(max_files: usize) -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    let web_root = dir.path().join("www");
    std::fs::create_dir_all(&web_root).unwrap();
    write_templates(&web_root);

    let config = Config {
        listen_addr: "127.0.0.1:0".to_string(),
        web_root,
        upload_dir: None,
        max_files,
        max_connections: 16,
        credentials: Credentials {
            username: "alice".to_string(),
            password: "secret".to_string(),
        },
    };

    let ctx = Arc::new(AppContext::new(config).await.unwrap());
    TestServer { dir, ctx }
}

fn write_templates(root: &Path) {
    let pages = [
        ("index.html", "<form id=\"login\">[${error_message}]</form>"),
        ("home.html", "<h1>HOME ${file_count}/${max_files}</h1><ul>${file_list_items}</ul>"),
        ("file-list.html", "<h1>LIST</h1><ul>${file_list_items}</ul>"),
        ("upload-success.html", "<h1>UPLOADED ${file_name}</h1>"),
        ("error.html", "<h1>ERROR</h1><p>${error_message}</p>"),
        ("style.css", "body { color: black; }"),
    ];
    for (name, content) in pages {
        std::fs::write(root.join(name), content).unwrap();
    }
}

/// Writes the request, closes the write side and reads the whole response.
pub async fn exchange<S>(mut stream: S, request: &[u8]) -> RawResponse
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    // The server may answer and hang up before reading everything.
    let _ = stream.write_all(request).await;
    let _ = stream.shutdown().await;

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    RawResponse::parse(&raw)
}

#[derive(Debug)]
pub struct RawResponse {
    pub status_line: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn parse(raw: &[u8]) -> Self {
        let split = raw
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .expect("response has no header terminator");
        let head = String::from_utf8(raw[..split].to_vec()).unwrap();
        let mut lines = head.split("\r\n");
        let status_line = lines.next().unwrap().to_string();
        let headers = lines
            .map(|l| {
                let (k, v) = l.split_once(": ").unwrap();
                (k.to_string(), v.to_string())
            })
            .collect();

        Self {
            status_line,
            headers,
            body: raw[split + 4..].to_vec(),
        }
    }

    pub fn status(&self) -> u16 {
        self.status_line.split(' ').nth(1).unwrap().parse().unwrap()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub fn get(path: &str) -> Vec<u8> {
    format!("GET {path} HTTP/1.0\r\n\r\n").into_bytes()
}

pub fn form_post(path: &str, body: &str) -> Vec<u8> {
    format!(
        "POST {path} HTTP/1.0\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    )
    .into_bytes()
}

pub fn multipart_body(filename: &str, payload: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"filename\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: text/plain\r\n\r\n");
    body.extend_from_slice(payload);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn upload_request(body: &[u8]) -> Vec<u8> {
    let mut req = format!(
        "POST /upload HTTP/1.0\r\nHost: localhost\r\nContent-Type: multipart/form-data; boundary={BOUNDARY}\r\nContent-Length: {}\r\n\r\n",
        body.len()
    )
    .into_bytes();
    req.extend_from_slice(body);
    req
}
