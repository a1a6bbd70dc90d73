use lazy_static::lazy_static;
use regex::RegexSet;

use super::ScanError;

lazy_static! {
    // Matched against the literal URL; hosts are never resolved, so a public
    // name pointing at a private address gets through.
    static ref PRIVATE_HOSTS: RegexSet = RegexSet::new([
        r"(?i)^https?://localhost",
        r"(?i)^https?://127\.",
        r"(?i)^https?://10\.",
        r"(?i)^https?://172\.(1[6-9]|2\d|3[01])\.",
        r"(?i)^https?://192\.168\.",
        r"(?i)^https?://0\.",
        r"(?i)^https?://\[::1\]",
    ])
    .unwrap();
}

pub fn ensure_well_formed(url: &str) -> Result<(), ScanError> {
    url::Url::parse(url)
        .map(|_| ())
        .map_err(|_| ScanError::InvalidUrl("Please enter a valid URL".into()))
}

pub fn is_private_address(url: &str) -> bool {
    PRIVATE_HOSTS.is_match(url)
}

pub fn ensure_public_address(url: &str) -> Result<(), ScanError> {
    if is_private_address(url) {
        return Err(ScanError::PrivateAddressBlocked);
    }
    Ok(())
}

pub fn ensure_http_scheme(url: &str) -> Result<(), ScanError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ScanError::InvalidUrl(
            "URL must start with http:// or https://".into(),
        ))
    }
}

/// URL checks in submission order: well-formed, public host, http(s).
pub fn validate_scan_url(url: &str) -> Result<(), ScanError> {
    ensure_well_formed(url)?;
    ensure_public_address(url)?;
    ensure_http_scheme(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_private_hosts() {
        for url in [
            "http://127.0.0.1/",
            "http://192.168.1.5/",
            "http://10.0.0.1/",
            "https://localhost:3000/admin",
            "http://LOCALHOST/",
            "http://172.16.0.1/",
            "http://172.31.255.255/",
            "http://0.0.0.0/",
            "http://[::1]:8080/",
        ] {
            assert!(
                matches!(validate_scan_url(url), Err(ScanError::PrivateAddressBlocked)),
                "{url} should be blocked"
            );
        }
    }

    #[test]
    fn accepts_public_hosts() {
        for url in [
            "https://example.com/",
            "http://172.32.0.1/",
            "http://172.15.0.1/",
            "https://192.169.0.1/",
        ] {
            assert!(validate_scan_url(url).is_ok(), "{url} should pass");
        }
    }

    #[test]
    fn rejects_malformed_urls() {
        for url in ["", "example.com", "not a url", "http//missing-colon.com"] {
            match validate_scan_url(url) {
                Err(ScanError::InvalidUrl(msg)) => assert_eq!(msg, "Please enter a valid URL"),
                other => panic!("{url:?} gave {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_non_http_schemes() {
        for url in ["ftp://example.com/file", "file:///etc/passwd", "mailto:a@b.io"] {
            match validate_scan_url(url) {
                Err(ScanError::InvalidUrl(msg)) => {
                    assert_eq!(msg, "URL must start with http:// or https://")
                }
                other => panic!("{url:?} gave {other:?}"),
            }
        }
    }
}
