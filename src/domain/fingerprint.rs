use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

const FINGERPRINT_LEN: usize = 40;

/// Opaque per-process identity carried in front of every datagram.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Derives a fresh identity from the hostname and a random salt, so two
    /// processes on the same host never collide.
    pub fn generate(hostname: &str) -> Self {
        let seed = format!("{hostname}_{}", Uuid::new_v4().simple());
        let digest = hex::encode(Sha256::digest(seed.as_bytes()));

        Self(digest[..FINGERPRINT_LEN].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Fingerprint {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Fingerprint {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
