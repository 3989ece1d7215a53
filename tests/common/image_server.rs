//! Minimal HTTP/1.1 server with fixed routes for integration tests.
//!
//! Every response closes the connection. Routes:
//! `/image.png`, `/image.gif`, `/page.html`, `/no-length.png` (no
//! Content-Length), `/empty`, `/redirect` (302 to `/image.png`),
//! `/latin1-header.png` (a header value that is not UTF-8), `/image.avif`,
//! `/missing` (404), `/forbidden` (403), `/broken` (500), `/slow` (answers
//! after `SLOW_DELAY`), `/user-agent` (echoes the request's User-Agent in
//! an `X-Seen-User-Agent` header).

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

pub const SLOW_DELAY: Duration = Duration::from_secs(3);

pub const PNG_WIDTH: u32 = 64;
pub const PNG_HEIGHT: u32 = 32;
pub const GIF_WIDTH: u16 = 5;
pub const GIF_HEIGHT: u16 = 7;

/// Signature and IHDR chunk of a PNG, followed by an empty IEND.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut b = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    b.extend_from_slice(&13u32.to_be_bytes());
    b.extend_from_slice(b"IHDR");
    b.extend_from_slice(&width.to_be_bytes());
    b.extend_from_slice(&height.to_be_bytes());
    b.extend_from_slice(&[8, 6, 0, 0, 0]);
    b.extend_from_slice(&[0, 0, 0, 0]);
    b.extend_from_slice(&0u32.to_be_bytes());
    b.extend_from_slice(b"IEND");
    b.extend_from_slice(&[0xAE, 0x42, 0x60, 0x82]);
    b
}

pub fn gif_bytes(width: u16, height: u16) -> Vec<u8> {
    let mut b = b"GIF89a".to_vec();
    b.extend_from_slice(&width.to_le_bytes());
    b.extend_from_slice(&height.to_le_bytes());
    b.extend_from_slice(&[0x00, 0x00, 0x00, 0x3B]);
    b
}

pub const AVIF_WIDTH: u32 = 120;
pub const AVIF_HEIGHT: u32 = 90;

fn bmff_box(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut b = ((payload.len() + 8) as u32).to_be_bytes().to_vec();
    b.extend_from_slice(kind);
    b.extend_from_slice(payload);
    b
}

/// `ftyp` and a `meta` box carrying a single `ispe` property; no image data.
pub fn avif_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut ftyp = b"avif".to_vec();
    ftyp.extend_from_slice(&0u32.to_be_bytes());
    ftyp.extend_from_slice(b"avifmif1miaf");

    let mut hdlr = vec![0u8; 8];
    hdlr.extend_from_slice(b"pict");
    hdlr.extend_from_slice(&[0u8; 13]);
    let mut ispe = vec![0u8; 4];
    ispe.extend_from_slice(&width.to_be_bytes());
    ispe.extend_from_slice(&height.to_be_bytes());
    let mut iprp = bmff_box(b"ipco", &bmff_box(b"ispe", &ispe));
    iprp.extend(bmff_box(b"ipma", &[0, 0, 0, 0, 0, 0, 0, 1, 0, 1, 1, 0x81]));

    let mut meta = vec![0u8; 4];
    meta.extend(bmff_box(b"hdlr", &hdlr));
    meta.extend(bmff_box(b"pitm", &[0, 0, 0, 0, 0, 1]));
    meta.extend(bmff_box(b"iprp", &iprp));

    let mut b = bmff_box(b"ftyp", &ftyp);
    b.extend(bmff_box(b"meta", &meta));
    b
}

pub const HTML: &str = "<!DOCTYPE html><html><body><p>not an image</p></body></html>";

/// Starts the server on a background thread. Returns the base URL without a
/// trailing slash (e.g. "http://127.0.0.1:12345"). Runs until the process exits.
pub fn start() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            thread::spawn(move || handle(stream));
        }
    });
    format!("http://127.0.0.1:{}", port)
}

/// A URL on a port nobody listens on.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/image.png", port)
}

fn handle(mut stream: TcpStream) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(10)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let (path, user_agent) = parse_request(request);

    let response = match path {
        "/image.png" => ok("image/png", png_bytes(PNG_WIDTH, PNG_HEIGHT), true),
        "/image.gif" => ok("image/gif", gif_bytes(GIF_WIDTH, GIF_HEIGHT), true),
        "/page.html" => ok("text/html; charset=utf-8", HTML.as_bytes().to_vec(), true),
        "/no-length.png" => ok("image/png", png_bytes(PNG_WIDTH, PNG_HEIGHT), false),
        "/image.avif" => ok("image/avif", avif_bytes(AVIF_WIDTH, AVIF_HEIGHT), true),
        "/latin1-header.png" => {
            let body = png_bytes(PNG_WIDTH, PNG_HEIGHT);
            let mut r = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nContent-Length: {}\r\n",
                body.len()
            )
            .into_bytes();
            r.extend_from_slice(b"X-Caption: caf\xE9\r\nConnection: close\r\n\r\n");
            r.extend_from_slice(&body);
            r
        }
        "/empty" => ok("application/octet-stream", Vec::new(), true),
        "/redirect" => status_only("302 Found", "Location: /image.png\r\n"),
        "/missing" => status_only("404 Not Found", ""),
        "/forbidden" => status_only("403 Forbidden", ""),
        "/broken" => status_only("500 Internal Server Error", ""),
        "/slow" => {
            thread::sleep(SLOW_DELAY);
            ok("image/png", png_bytes(1, 1), true)
        }
        "/user-agent" => {
            let extra = format!("X-Seen-User-Agent: {}\r\n", user_agent.unwrap_or(""));
            status_only("200 OK", &extra)
        }
        _ => status_only("404 Not Found", ""),
    };
    let _ = stream.write_all(&response);
    let _ = stream.flush();
}

fn ok(content_type: &str, body: Vec<u8>, with_length: bool) -> Vec<u8> {
    let length = if with_length {
        format!("Content-Length: {}\r\n", body.len())
    } else {
        String::new()
    };
    let mut r = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: {}\r\n{}Connection: close\r\n\r\n",
        content_type, length
    )
    .into_bytes();
    r.extend_from_slice(&body);
    r
}

fn status_only(status: &str, extra_headers: &str) -> Vec<u8> {
    format!(
        "HTTP/1.1 {}\r\n{}Content-Length: 0\r\nConnection: close\r\n\r\n",
        status, extra_headers
    )
    .into_bytes()
}

/// Returns (path, User-Agent header).
fn parse_request(request: &str) -> (&str, Option<&str>) {
    let mut path = "";
    let mut user_agent = None;
    for (i, line) in request.lines().enumerate() {
        let line = line.trim();
        if i == 0 {
            path = line.split_whitespace().nth(1).unwrap_or("");
            continue;
        }
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("user-agent") {
                user_agent = Some(value.trim());
            }
        }
    }
    (path, user_agent)
}
