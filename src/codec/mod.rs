//! Frame codecs: binary (length-delimited + LRC/CRC16), ASCII (delimited
//! printable) and SBUS (fixed-width radio-control). Each module exposes a
//! pair of free functions, `encode`/`decode`, operating in terms of
//! [`crate::buffer::ReceiveBuffer`] for decode.

pub mod ascii;
pub mod binary;
pub mod sbus;

pub use ascii::AsciiFrame;
pub use binary::BinaryFrame;
pub use sbus::SbusFrame;
