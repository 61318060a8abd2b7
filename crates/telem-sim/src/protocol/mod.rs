//! Wire protocol shared with the receiving server.
//!
//! Both transports carry the same fixed-size payload ([`wire`]); the serial
//! channel additionally prefixes each payload with [`wire::START_MARKER`] so
//! a receiver can locate frame boundaries in a continuous byte stream.

pub mod wire;

pub use wire::{decode, encode, PACKET_LEN, START_MARKER};
