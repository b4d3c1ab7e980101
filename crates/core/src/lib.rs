//! This crate is used as a utilities library for common functionality across
//! [squish64](https://crates.io/crates/squish64-ncompress) modules.
//!
//! By default, this crate only enables modules which do not have any crate dependencies (aside from
//! snafu, which is required for errors).

#![deny(unused_crate_dependencies)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
#[allow(unused_imports)]
mod no_std {
    extern crate alloc;
    pub use alloc::boxed::Box;
    pub use alloc::format;
    pub use alloc::string::String;
}

pub mod prelude;

pub mod data;
pub mod util;

#[cfg(feature = "std")]
pub mod identify;
