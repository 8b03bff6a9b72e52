use axum::{extract::Request, middleware::Next, response::Response};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Moment the server started handling a request. Handlers read it back to
/// time their own work from the same origin as the response headers.
#[derive(Debug, Clone, Copy)]
pub struct RequestStart(pub Instant);

impl RequestStart {
    pub fn elapsed_ms(&self) -> f64 {
        self.0.elapsed().as_secs_f64() * 1000.0
    }
}

/// Stamps `RequestStart` on the way in; on the way out adds
/// `X-Response-Time-Us` and `Server-Timing` and logs the request.
pub async fn timing_middleware(mut req: Request, next: Next) -> Response {
    let start = RequestStart(Instant::now());
    req.extensions_mut().insert(start);

    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let mut response = next.run(req).await;
    let elapsed = start.0.elapsed();

    stamp_headers(&mut response, elapsed);

    let status = response.status().as_u16();
    let us = elapsed.as_micros() as u64;
    match stats_client(&path) {
        // Stream requests live until the client leaves
        Some(_) if path.ends_with("/stream") => {}
        Some(client_id) => info!(%method, client_id, status, us, "stats"),
        // Pings arrive every tick and log their own client id at debug
        None if path == "/ping" => debug!(status, us, "ping handled"),
        None => info!(%method, %path, status, us, "request"),
    }

    response
}

fn stamp_headers(response: &mut Response, elapsed: Duration) {
    let headers = response.headers_mut();
    if let Ok(val) = elapsed.as_micros().to_string().parse() {
        headers.insert("X-Response-Time-Us", val);
    }
    let dur = format!("total;dur={:.3}", elapsed.as_secs_f64() * 1000.0);
    if let Ok(val) = dur.parse() {
        headers.insert("Server-Timing", val);
    }
}

/// Client id from `/stats/:client_id[/stream]`.
fn stats_client(path: &str) -> Option<&str> {
    let rest = path.strip_prefix("/stats/")?;
    rest.split('/').next().filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_paths_yield_client_id() {
        assert_eq!(stats_client("/stats/abc"), Some("abc"));
        assert_eq!(stats_client("/stats/abc/stream"), Some("abc"));
        assert_eq!(stats_client("/stats"), None);
        assert_eq!(stats_client("/ping"), None);
    }
}
