//! Single-stream HTTP GET into an open file sink.

use crate::error::FetchError;
use crate::materialize::Sink;
use std::io::Write;
use std::time::Duration;

/// Streams the body at `url` into `sink`. Returns the number of bytes written.
pub trait ByteTransport {
    fn download(&self, url: &str, sink: &mut Sink) -> Result<u64, FetchError>;
}

/// libcurl GET, body written to the sink as it arrives. No retries, no total timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    connect_timeout: Duration,
}

impl HttpTransport {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl ByteTransport for HttpTransport {
    fn download(&self, url: &str, sink: &mut Sink) -> Result<u64, FetchError> {
        let net = |e: curl::Error| FetchError::network(url, e);
        let mut written = 0u64;
        let mut write_err = None;

        let mut easy = curl::easy::Easy::new();
        easy.url(url).map_err(net)?;
        easy.follow_location(true).map_err(net)?;
        easy.max_redirections(10).map_err(net)?;
        easy.connect_timeout(self.connect_timeout).map_err(net)?;
        // Reject error pages instead of writing them into the map file.
        easy.fail_on_error(true).map_err(net)?;

        let result = {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| match sink.write_all(data) {
                    Ok(()) => {
                        written += data.len() as u64;
                        Ok(data.len())
                    }
                    Err(e) => {
                        tracing::warn!("download write failed: {}", e);
                        write_err = Some(e);
                        Ok(0) // abort transfer
                    }
                })
                .map_err(net)?;
            transfer.perform()
        };

        if let Some(e) = write_err {
            return Err(FetchError::filesystem(sink.path(), e));
        }
        if let Err(e) = result {
            if e.is_http_returned_error() {
                let code = easy.response_code().unwrap_or(0);
                return Err(FetchError::network(url, format!("GET returned HTTP {}", code)));
            }
            return Err(net(e));
        }

        let code = easy.response_code().map_err(net)?;
        if !(200..300).contains(&code) {
            return Err(FetchError::network(url, format!("GET returned HTTP {}", code)));
        }
        sink.flush().map_err(|e| FetchError::filesystem(sink.path(), e))?;
        Ok(written)
    }
}
