use url::Url;

/// Extracts the authority (host plus explicit port) from a URL
///
/// The host is lowercased. A port is only included when the URL names one
/// that differs from the scheme's default, so `https://example.com:443/` and
/// `https://example.com/` share the authority `example.com`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use ripple_mirror::url::extract_authority;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_authority(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(extract_authority(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn extract_authority(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}
