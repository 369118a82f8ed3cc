//! External IP retrieval.
//!
//! [`fetcher`] talks to the public echo endpoint over HTTPS; [`poller`]
//! runs fetches on a worker thread so the GUI thread never blocks on the
//! network.

pub mod fetcher;
pub mod poller;

pub use fetcher::{FetchError, IpFetcher, DEFAULT_ENDPOINT};
pub use poller::{FetchOutcome, PollGate, Poller};

#[cfg(test)]
pub(crate) mod test_http {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Minimal one-shot HTTP server on a loopback port.
    ///
    /// Answers a single request with the given status line and body, then
    /// closes. Returns the endpoint URL to point a fetcher at.
    pub(crate) fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let addr = listener.local_addr().expect("local addr");
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf);
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{addr}")
    }

    /// Address of a loopback port that nothing is listening on.
    pub(crate) fn closed_endpoint() -> String {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
            listener.local_addr().expect("local addr")
        };
        format!("http://{addr}")
    }
}
