mod cache;
mod flocon;
pub mod network;
pub mod orchestrator;
mod peer;

pub use cache::PackageCache;
pub use flocon::Flocon;
pub use orchestrator::Orchestrator;
pub use peer::PeerRegistry;
