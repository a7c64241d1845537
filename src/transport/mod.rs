//! Wire-level transport. Currently a single UDP endpoint; see [`udp`].

pub mod udp;

pub use udp::UdpEndpoint;
