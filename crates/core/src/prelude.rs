//! Convenient re-exports of commonly used data types, designed to make crate usage painless.
//!
//! For example, when working with [`DataCursorRef`], you have to explicitly refer to
//! [`data::Error`].
//!
//! The contents of this module can be used by including the following in any module:
//! ```
//! use squish64_core::prelude::*;
//! ```

#[doc(inline)]
pub use crate::data::{
    DataCursorMut, DataCursorRef, DataCursorTrait, Endian, EndianRead, EndianWrite, SeekFrom,
};
#[cfg(feature = "std")]
pub use crate::identify::*;

/// Contains [`data::Error`], which is used in Results returned by [`DataCursorRef`] and
/// [`DataCursorMut`]
pub mod data {
    pub use crate::data::Error;
}

pub mod util {
    pub use crate::util::format_size;
}
