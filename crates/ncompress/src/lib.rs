//! This crate contains modules for [squish64](https://crates.io/crates/squish64-capi) that add
//! support for the compression formats shared across first-party Nintendo 64 era games, along with
//! the gzip wrapper their toolchains relied on.

#![deny(unused_crate_dependencies)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
#[allow(unused_imports)]
mod no_std {
    extern crate alloc;
    pub use alloc::boxed::Box;
    pub use alloc::vec;
    pub use alloc::vec::Vec;
}

// All public modules
#[cfg(feature = "gzip")]
pub mod gzip;
pub mod mio0;
pub mod yay0;
pub mod yaz0;

// For internal use only right now
mod algorithms;
mod codec;
mod split;

// Prelude, for convenience
pub mod prelude;

// Dev-dependencies are exercised by the integration tests and benches, which this lint can't see.
#[cfg(test)]
use criterion as _;
#[cfg(test)]
use rand as _;
