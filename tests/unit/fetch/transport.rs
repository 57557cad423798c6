use super::*;

#[test]
fn http_transport_builds_with_timeout() {
    assert!(HttpTransport::new(Duration::from_secs(10)).is_ok());
}

#[test]
fn client_setup_failure_is_not_a_config_error() {
    let err = client_setup_error(std::io::Error::other("tls backend unavailable"));
    assert!(matches!(err, HimawariError::Other(_)), "{err:?}");
    let msg = format!("{err:#}");
    assert!(msg.contains("build HTTP client"), "{msg}");
    assert!(msg.contains("tls backend unavailable"), "{msg}");
}

#[test]
fn status_error_names_url_and_code() {
    let err = FetchError::Status {
        url: "https://mirror.test/4d/550/x.png".to_string(),
        status: 503,
    };
    assert_eq!(
        err.to_string(),
        "'https://mirror.test/4d/550/x.png' returned HTTP 503"
    );
}
