mod command;
mod config;
mod download;
mod fingerprint;
pub mod message;
mod mirror;
mod peer;
pub mod url;

pub use command::PresenceCommand;
pub use config::Config;
pub use config::PresenceSettings;
pub use download::DownloadPath;
pub use download::DownloadPathError;
pub use download::Redirect;
pub use fingerprint::Fingerprint;
pub use message::Datagram;
pub use message::Message;
pub use message::ProtocolError;
pub use mirror::MirrorError;
pub use mirror::MirrorTemplate;
pub use peer::Peer;
pub use peer::PeerStatus;
