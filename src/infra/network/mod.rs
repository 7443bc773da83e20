pub mod dns;
pub mod multicast;
