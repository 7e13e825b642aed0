//! Minimal HTTP/1.1 server that supports HEAD and Range GET for integration tests.
//!
//! Serves a single static body. Responds to HEAD with Content-Length and
//! Accept-Ranges: bytes; responds to GET with Range with 206 Partial Content.
//! Faults (missing or inflated length, ignored ranges, failing, slow, short,
//! long or shifted ranges) are switched on through `RangeServerOptions`.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct RangeServerOptions {
    /// If false, HEAD returns 405.
    pub head_allowed: bool,
    /// If false, HEAD omits Content-Length.
    pub send_content_length: bool,
    /// HEAD advertises this Content-Length instead of the real one.
    pub advertised_length: Option<u64>,
    /// If false, GET ignores Range and always returns 200 with the full body.
    pub support_ranges: bool,
    /// GETs whose range starts at this offset get this status and no body.
    pub fail_range: Option<(u64, u16)>,
    /// The first N GETs (any range) get 503.
    pub transient_failures: usize,
    /// GET for the range starting at this offset returns one byte too few.
    pub short_range: Option<u64>,
    /// GET for the range starting at this offset sends one byte more than asked.
    pub long_range: Option<u64>,
    /// GET for the range starting at this offset serves the same number of
    /// bytes one offset later, with a Content-Range saying so.
    pub shifted_range: Option<u64>,
    /// GET for the range starting at this offset sleeps this long before answering.
    pub stall_range: Option<(u64, Duration)>,
    /// Each GET sleeps `stagger * (total - start) / total`, so earlier ranges finish last.
    pub stagger: Option<Duration>,
}

impl Default for RangeServerOptions {
    fn default() -> Self {
        Self {
            head_allowed: true,
            send_content_length: true,
            advertised_length: None,
            support_ranges: true,
            fail_range: None,
            transient_failures: 0,
            short_range: None,
            long_range: None,
            shifted_range: None,
            stall_range: None,
            stagger: None,
        }
    }
}

/// Handle to a running server.
pub struct RangeServer {
    /// Base URL, e.g. "http://127.0.0.1:12345/file.bin".
    pub url: String,
    gets: Arc<AtomicUsize>,
    answered: Arc<Mutex<Vec<u64>>>,
}

impl RangeServer {
    /// Number of GET requests served so far.
    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// Start offsets of the 206 responses, in the order they were written.
    pub fn answered_starts(&self) -> Vec<u64> {
        self.answered.lock().unwrap().clone()
    }
}

struct Shared {
    body: Vec<u8>,
    opts: RangeServerOptions,
    gets: Arc<AtomicUsize>,
    answered: Arc<Mutex<Vec<u64>>>,
}

/// Starts a server in a background thread serving `body`.
/// The server runs until the process exits.
pub fn start(body: Vec<u8>) -> RangeServer {
    start_with_options(body, RangeServerOptions::default())
}

/// Like `start` but allows customizing server behavior.
pub fn start_with_options(body: Vec<u8>, opts: RangeServerOptions) -> RangeServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let gets = Arc::new(AtomicUsize::new(0));
    let answered = Arc::new(Mutex::new(Vec::new()));
    let shared = Arc::new(Shared {
        body,
        opts,
        gets: Arc::clone(&gets),
        answered: Arc::clone(&answered),
    });
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let shared = Arc::clone(&shared);
            thread::spawn(move || handle(stream, &shared));
        }
    });
    RangeServer {
        url: format!("http://127.0.0.1:{}/file.bin", port),
        gets,
        answered,
    }
}

/// A URL on a port nobody listens on.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/file.bin", port)
}

fn respond(stream: &mut TcpStream, status: &str, headers: &[String], body: &[u8]) {
    let mut head = format!("HTTP/1.1 {}\r\nConnection: close\r\n", status);
    for h in headers {
        head.push_str(h);
        head.push_str("\r\n");
    }
    head.push_str("\r\n");
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
    let _ = stream.flush();
}

fn handle(mut stream: TcpStream, shared: &Shared) {
    let body = shared.body.as_slice();
    let opts = shared.opts;
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let (method, range) = parse_request(request);
    let total = body.len() as u64;

    if method.eq_ignore_ascii_case("HEAD") {
        if !opts.head_allowed {
            respond(&mut stream, "405 Method Not Allowed", &[], &[]);
            return;
        }
        let mut headers = vec!["Accept-Ranges: bytes".to_string()];
        if opts.send_content_length {
            let advertised = opts.advertised_length.unwrap_or(total);
            headers.push(format!("Content-Length: {}", advertised));
        }
        respond(&mut stream, "200 OK", &headers, &[]);
        return;
    }
    if !method.eq_ignore_ascii_case("GET") {
        respond(&mut stream, "405 Method Not Allowed", &[], &[]);
        return;
    }

    let served = shared.gets.fetch_add(1, Ordering::SeqCst);
    let start = range.map(|(s, _)| s).unwrap_or(0);

    if let Some(stagger) = opts.stagger {
        let left = total.saturating_sub(start) as u32;
        thread::sleep(stagger * left / (total.max(1) as u32));
    }
    if let Some((at, pause)) = opts.stall_range {
        if at == start {
            thread::sleep(pause);
        }
    }
    if served < opts.transient_failures {
        respond(&mut stream, "503 Service Unavailable", &["Content-Length: 0".into()], &[]);
        return;
    }
    if let Some((at, code)) = opts.fail_range {
        if at == start {
            let status = format!("{} Injected Failure", code);
            respond(&mut stream, &status, &["Content-Length: 0".into()], &[]);
            return;
        }
    }

    let range = range.filter(|_| opts.support_ranges);
    let Some((start, end_incl)) = range else {
        respond(
            &mut stream,
            "200 OK",
            &[format!("Content-Length: {}", total)],
            body,
        );
        return;
    };
    let end_incl = end_incl.min(total.saturating_sub(1));
    if start > end_incl {
        respond(
            &mut stream,
            "416 Range Not Satisfiable",
            &[format!("Content-Range: bytes */{}", total), "Content-Length: 0".into()],
            &[],
        );
        return;
    }
    let (mut first, mut last) = (start, end_incl);
    if opts.shifted_range == Some(start) && last + 1 < total {
        first += 1;
        last += 1;
    }
    let mut payload = body[first as usize..=last as usize].to_vec();
    if opts.short_range == Some(start) {
        payload.pop();
    }
    if opts.long_range == Some(start) {
        payload.push(0xAA);
    }
    respond(
        &mut stream,
        "206 Partial Content",
        &[
            format!("Content-Length: {}", payload.len()),
            format!("Content-Range: bytes {}-{}/{}", first, last, total),
        ],
        &payload,
    );
    shared.answered.lock().unwrap().push(start);
}

/// Returns (method, optional (start, end_inclusive) for Range: bytes=X-Y).
fn parse_request(request: &str) -> (&str, Option<(u64, u64)>) {
    let mut lines = request.lines();
    let method = lines
        .next()
        .and_then(|l| l.split_whitespace().next())
        .unwrap_or("");
    let mut range = None;
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        if !name.trim().eq_ignore_ascii_case("range") {
            continue;
        }
        let Some(bounds) = value.trim().strip_prefix("bytes=") else {
            continue;
        };
        if let Some((a, b)) = bounds.split_once('-') {
            let start = a.trim().parse::<u64>().unwrap_or(0);
            let end = b.trim().parse::<u64>().unwrap_or(u64::MAX);
            range = Some((start, end));
        }
    }
    (method, range)
}
