//! Modbus RTU checksums and protocol tables in pure Rust.
//!
//! `rustmod-core` provides the `no_std`-compatible building blocks used to
//! decode Modbus RTU traffic: the CRC16 engine, frame size limits, and the
//! function, exception and diagnostics code tables.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

#[cfg(feature = "std")]
extern crate std;

pub mod error;
pub mod frame;
pub mod pdu;

pub use error::DecodeError;
