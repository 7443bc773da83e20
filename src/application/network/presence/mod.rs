pub mod handle;
pub mod interface;
pub mod service;

pub use handle::PresenceHandle;
pub use interface::MulticastInterface;
pub use service::PresenceService;
