use std::net::IpAddr;

/// Builds an absolute URL from typed parts, encoding every path segment
/// that did not come from trusted configuration.
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    scheme: String,
    authority: String,
    path: String,
}

impl UrlBuilder {
    pub fn new(scheme: &str, authority: &str) -> Self {
        Self {
            scheme: scheme.to_string(),
            authority: authority.to_string(),
            path: String::new(),
        }
    }

    pub fn http(host: IpAddr, port: u16) -> Self {
        let authority = match host {
            IpAddr::V4(ip) => format!("{ip}:{port}"),
            IpAddr::V6(ip) => format!("[{ip}]:{port}"),
        };
        Self::new("http", &authority)
    }

    /// Appends a segment as-is. The caller guarantees it is already URL-safe.
    pub fn raw_segment(mut self, segment: &str) -> Self {
        self.path.push('/');
        self.path.push_str(segment);
        self
    }

    pub fn segment(self, segment: &str) -> Self {
        let encoded = encode_segment(segment);
        self.raw_segment(&encoded)
    }

    pub fn build(self) -> String {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        format!("{}://{}{}", self.scheme, self.authority, path)
    }
}

/// Percent-encodes everything outside RFC 3986 `pchar`, which keeps package
/// names such as `foo-1:2.0+git-1-x86_64.pkg.tar.zst` readable.
pub fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());

    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'.'
            | b'_'
            | b'~'
            | b'!'
            | b'$'
            | b'&'
            | b'\''
            | b'('
            | b')'
            | b'*'
            | b'+'
            | b','
            | b';'
            | b'='
            | b':'
            | b'@' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
