//! Loopback HTTP server standing in for the GitHub API and raw host.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone)]
pub struct Route {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// Announce more bytes than are sent, then hang up.
    pub truncate: bool,
}

impl Route {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
            truncate: false,
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn truncated(mut self) -> Self {
        self.truncate = true;
        self
    }
}

/// A request as seen by the server: path plus lower-cased header lines.
#[derive(Debug, Clone)]
pub struct Hit {
    pub path: String,
    pub headers: Vec<String>,
}

#[derive(Clone)]
pub struct FixtureServer {
    base: String,
    routes: Arc<Mutex<HashMap<String, Route>>>,
    hits: Arc<Mutex<Vec<Hit>>>,
}

impl FixtureServer {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let base = format!("http://{}", listener.local_addr().unwrap());
        let server = Self {
            base,
            routes: Arc::default(),
            hits: Arc::default(),
        };

        let routes = server.routes.clone();
        let hits = server.hits.clone();
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                let _ = serve(stream, &routes, &hits);
            }
        });

        server
    }

    pub fn url(&self) -> &str {
        &self.base
    }

    pub fn route(&self, path: &str, route: Route) -> &Self {
        self.routes.lock().unwrap().insert(path.to_string(), route);
        self
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.hits.lock().unwrap().clone()
    }

    pub fn hit_paths(&self) -> Vec<String> {
        self.hits().into_iter().map(|h| h.path).collect()
    }
}

fn serve(
    stream: TcpStream,
    routes: &Mutex<HashMap<String, Route>>,
    hits: &Mutex<Vec<Hit>>,
) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 || line == "\r\n" {
            break;
        }
        headers.push(line.trim_end().to_ascii_lowercase());
    }

    let target = request_line.split_whitespace().nth(1).unwrap_or("/");
    let path = target.split('?').next().unwrap_or(target).to_string();
    hits.lock().unwrap().push(Hit {
        path: path.clone(),
        headers,
    });

    let route = routes
        .lock()
        .unwrap()
        .get(&path)
        .cloned()
        .unwrap_or_else(|| Route::status(404, r#"{"message":"Not Found"}"#));

    let announced = if route.truncate {
        route.body.len() + 1024
    } else {
        route.body.len()
    };
    let mut out = stream;
    write!(
        out,
        "HTTP/1.1 {} Fixture\r\nContent-Length: {announced}\r\nConnection: close\r\n",
        route.status
    )?;
    for (name, value) in &route.headers {
        write!(out, "{name}: {value}\r\n")?;
    }
    out.write_all(b"\r\n")?;
    out.write_all(&route.body)?;
    out.flush()
}

/// JSON for one entry of a contents listing.
pub fn file_item(base: &str, name: &str, body_len: usize) -> String {
    format!(
        r#"{{"name":"{name}","path":"x/{name}","type":"file","size":{body_len},"download_url":"{base}/raw/{name}"}}"#
    )
}

pub fn dir_item(name: &str) -> String {
    format!(r#"{{"name":"{name}","path":"x/{name}","type":"dir","size":0,"download_url":null}}"#)
}

pub const WEEK_PATH: &str = "/repos/rfordatascience/tidytuesday/contents/data/2025/2025-03-04";

/// Serve the 2025-03-04 release with `(name, body)` files plus one
/// sub-directory.
pub fn serve_week(server: &FixtureServer, files: &[(&str, &str)]) {
    let items: Vec<String> = files
        .iter()
        .map(|(name, body)| file_item(server.url(), name, body.len()))
        .chain(std::iter::once(dir_item("pictures")))
        .collect();
    server.route(WEEK_PATH, Route::ok(format!("[{}]", items.join(","))));
    for (name, body) in files {
        server.route(&format!("/raw/{name}"), Route::ok(*body));
    }
}
