pub mod http;
pub mod mirrorlist;
pub mod network;
