use std::sync::Arc;
use std::time::Duration;
use sunseeker::http_config::HttpConfig;
use sunseeker::utils::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
use sunseeker::{SolarResult, WeatherRepository};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

const OK_BODY: &str = r#"{"results":{"sunrise":"2026-06-21T12:48:04+00:00","sunset":"2026-06-22T03:34:58+00:00","solar_noon":"2026-06-21T20:11:31+00:00","day_length":53214,"civil_twilight_begin":"2026-06-21T12:17:47+00:00","civil_twilight_end":"2026-06-22T04:05:15+00:00"},"status":"OK"}"#;

const INVALID_BODY: &str = r#"{"results":{"sunrise":"","sunset":"","solar_noon":"","day_length":0,"civil_twilight_begin":"","civil_twilight_end":""},"status":"INVALID_REQUEST"}"#;

/// Serves `responses` in order, one per connection, and reports each request line.
async fn serve(responses: Vec<(u16, &'static str)>) -> (String, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/", listener.local_addr().unwrap());
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        for (status, body) in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let request = String::from_utf8_lossy(&request);
            let _ = tx.send(request.lines().next().unwrap_or_default().to_string());

            let response = format!(
                "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        }
    });

    (base_url, rx)
}

fn fast_http(max_retries: u32) -> HttpConfig {
    HttpConfig {
        connect_timeout: Duration::from_secs(1),
        timeout: Duration::from_secs(2),
        max_retries,
        base_retry_delay: Duration::from_millis(10),
        max_retry_delay: Duration::from_millis(20),
        backoff_multiplier: 2.0,
    }
}

fn breaker(failure_threshold: u32) -> Arc<CircuitBreaker> {
    Arc::new(CircuitBreaker::new(CircuitBreakerConfig {
        failure_threshold,
        success_threshold: 1,
        timeout: Duration::from_secs(60),
    }))
}

#[tokio::test]
async fn test_fetch_solar_data_success() {
    let (base_url, mut requests) = serve(vec![(200, OK_BODY)]).await;
    let repo = WeatherRepository::new(&base_url, fast_http(1), breaker(3)).unwrap();

    match repo.fetch_solar_data(37.7749, -122.4194).await {
        SolarResult::Success(data) => {
            assert_eq!(data.sunrise, "2026-06-21T12:48:04+00:00");
            assert_eq!(data.day_length, "53214");
        }
        other => panic!("expected success, got {:?}", other),
    }

    let request_line = requests.recv().await.unwrap();
    assert!(request_line.starts_with("GET /json?"));
    assert!(request_line.contains("lat=37.7749"));
    assert!(request_line.contains("lng=-122.4194"));
    assert!(request_line.contains("formatted=0"));
}

#[tokio::test]
async fn test_non_ok_status_is_reported() {
    let (base_url, _requests) = serve(vec![(200, INVALID_BODY)]).await;
    let repo = WeatherRepository::new(&base_url, fast_http(1), breaker(3)).unwrap();

    assert_eq!(
        repo.fetch_solar_data(10.0, 10.0).await,
        SolarResult::Error("API status: INVALID_REQUEST".to_string())
    );
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let (base_url, mut requests) = serve(vec![(503, "{}"), (200, OK_BODY)]).await;
    let repo = WeatherRepository::new(&base_url, fast_http(3), breaker(3)).unwrap();

    assert!(matches!(repo.fetch_solar_data(10.0, 10.0).await, SolarResult::Success(_)));
    assert!(requests.recv().await.is_some());
    assert!(requests.recv().await.is_some());
}

#[tokio::test]
async fn test_breaker_opens_after_repeated_failures() {
    let (base_url, _requests) = serve(vec![(500, "{}")]).await;
    let shared = breaker(1);
    let repo = WeatherRepository::new(&base_url, fast_http(1), shared.clone()).unwrap();

    assert!(matches!(repo.fetch_solar_data(10.0, 10.0).await, SolarResult::Error(_)));
    assert_eq!(shared.get_state().await, CircuitState::Open);

    // Rejected without touching the network
    match repo.fetch_solar_data(10.0, 10.0).await {
        SolarResult::Error(message) => assert!(message.contains("open")),
        other => panic!("expected error, got {:?}", other),
    }
}
