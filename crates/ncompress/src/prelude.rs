//! Convenient re-exports of commonly used data types, designed to make crate usage painless.
//!
//! For example, you can refer to [`Yaz0`], but you have to use [`yaz0::Error`].
//!
//! The contents of this module can be used by including the following in any module:
//! ```
//! use squish64_ncompress::prelude::*;
//! ```

pub use crate::yaz0::Yaz0;

pub mod yaz0 {
    pub use crate::yaz0::{Error, Header};
}

pub use crate::yay0::Yay0;

pub mod yay0 {
    pub use crate::yay0::{Error, Header};
}

pub use crate::mio0::Mio0;

pub mod mio0 {
    pub use crate::mio0::{Error, Header};
}

#[cfg(feature = "gzip")]
pub use crate::gzip::Gzip;

#[cfg(feature = "gzip")]
pub mod gzip {
    pub use crate::gzip::Error;
}
