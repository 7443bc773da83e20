use std::net::IpAddr;
use tokio::task;
use tracing::{debug, warn};

/// Best-effort reverse lookup. `None` when there is no name for `ip`.
pub async fn reverse_lookup(ip: IpAddr) -> Option<String> {
    match task::spawn_blocking(move || dns_lookup::lookup_addr(&ip)).await {
        // The resolver echoes the address back when no PTR record exists.
        Ok(Ok(hostname)) if hostname != ip.to_string() => Some(hostname),
        Ok(Ok(_)) => None,
        Ok(Err(err)) => {
            debug!(%ip, "Reverse lookup failed: {err}");
            None
        }
        Err(err) => {
            warn!(%ip, "Reverse lookup task failed: {err}");
            None
        }
    }
}
