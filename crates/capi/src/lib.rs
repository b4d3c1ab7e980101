//! C-compatible bindings over the squish64 compression formats.
//!
//! Each format exposes the same four entry points: a pair of `bound` functions that compute how
//! large an output buffer has to be (without ever touching one), and the de/compressors
//! themselves. Buffers are always caller-allocated; `dst_len` is an in/out parameter that holds
//! the buffer capacity on entry, and is only updated — to the number of bytes written — when the
//! call returns [`SquishError::Okay`].
//!
//! All failures are reported through [`SquishError`]. Its numeric values are ABI-stable; callers
//! on the C side can store and compare them across library versions.

#![deny(unused_crate_dependencies)]

use num_enum::{IntoPrimitive, TryFromPrimitive};
use squish64_ncompress::prelude::*;

/// Status code returned by every entry point in this library.
///
/// The discriminants are part of the ABI and must never be reordered.
/// [`UnsupportedCompressionType`](Self::UnsupportedCompressionType) and [`Vpk0`](Self::Vpk0) are
/// reserved for formats this library does not currently ship; they keep their positions so the
/// numbering stays stable if those formats are added.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
pub enum SquishError {
    Okay,
    InvalidYay0Header,
    InvalidYaz0Header,
    InvalidMio0Header,
    UnsupportedCompressionType,
    UnalignedRead,
    ByteConversion,
    OutOfBounds,
    NullPointer,
    InvalidCompressionLevel,
    Vpk0,
}

impl From<yaz0::Error> for SquishError {
    #[inline]
    fn from(error: yaz0::Error) -> Self {
        match error {
            yaz0::Error::InvalidMagic => Self::InvalidYaz0Header,
            yaz0::Error::FileTooBig => Self::ByteConversion,
            _ => Self::OutOfBounds,
        }
    }
}

impl From<yay0::Error> for SquishError {
    #[inline]
    fn from(error: yay0::Error) -> Self {
        match error {
            yay0::Error::InvalidMagic => Self::InvalidYay0Header,
            yay0::Error::UnalignedSection => Self::UnalignedRead,
            yay0::Error::FileTooBig => Self::ByteConversion,
            _ => Self::OutOfBounds,
        }
    }
}

impl From<mio0::Error> for SquishError {
    #[inline]
    fn from(error: mio0::Error) -> Self {
        match error {
            mio0::Error::InvalidMagic => Self::InvalidMio0Header,
            mio0::Error::UnalignedSection => Self::UnalignedRead,
            mio0::Error::FileTooBig => Self::ByteConversion,
            _ => Self::OutOfBounds,
        }
    }
}

impl From<gzip::Error> for SquishError {
    #[inline]
    fn from(error: gzip::Error) -> Self {
        match error {
            gzip::Error::InvalidLevel => Self::InvalidCompressionLevel,
            gzip::Error::Deflate { .. } => Self::ByteConversion,
            _ => Self::OutOfBounds,
        }
    }
}

macro_rules! squish64_format_abi {
    ($fmt:ident, $ty:ty) => {
        paste::paste! {
            #[doc = concat!("Puts the size needed to decompress the ", stringify!($ty),
                " data at `src` into `dst_size`, reading only the header.")]
            ///
            /// # Safety
            /// `src` must point to `src_len` readable bytes, and `dst_size` must be a valid
            /// writable pointer.
            #[no_mangle]
            pub unsafe extern "C" fn [<squish64_ $fmt _decompress_bound>](
                dst_size: *mut usize,
                src_len: usize,
                src: *const u8,
            ) -> SquishError {
                if dst_size.is_null() || src.is_null() {
                    return SquishError::NullPointer;
                }

                let src = core::slice::from_raw_parts(src, src_len);
                match <$ty>::read_header(src) {
                    Ok(header) => {
                        *dst_size = header.decompressed_size as usize;
                        SquishError::Okay
                    }
                    Err(error) => error.into(),
                }
            }

            #[doc = concat!("Decompresses the ", stringify!($ty),
                " data at `src` into `dst`, updating `dst_len` with the bytes written.")]
            ///
            /// `dst_len` holds the capacity of `dst` on entry and is left untouched on failure.
            ///
            /// # Safety
            /// `src` must point to `src_len` readable bytes, `dst_len` must be a valid writable
            /// pointer, and `dst` must point to `*dst_len` writable bytes.
            #[no_mangle]
            pub unsafe extern "C" fn [<squish64_ $fmt _decompress>](
                dst_len: *mut usize,
                dst: *mut u8,
                src_len: usize,
                src: *const u8,
            ) -> SquishError {
                if dst_len.is_null() || dst.is_null() || src.is_null() {
                    return SquishError::NullPointer;
                }

                let src = core::slice::from_raw_parts(src, src_len);
                let dst = core::slice::from_raw_parts_mut(dst, *dst_len);
                match <$ty>::decompress(src, dst) {
                    Ok(written) => {
                        *dst_len = written;
                        SquishError::Okay
                    }
                    Err(error) => error.into(),
                }
            }

            #[doc = concat!("Puts an upper bound for the size of compressing `src_len` bytes as ",
                stringify!($ty), " into `dst_size`.")]
            ///
            /// # Safety
            /// `src` must be non-null, and `dst_size` must be a valid writable pointer.
            #[no_mangle]
            pub unsafe extern "C" fn [<squish64_ $fmt _compress_bound>](
                dst_size: *mut usize,
                src_len: usize,
                src: *const u8,
            ) -> SquishError {
                if dst_size.is_null() || src.is_null() {
                    return SquishError::NullPointer;
                }

                *dst_size = <$ty>::worst_possible_size(src_len);
                SquishError::Okay
            }

            #[doc = concat!("Compresses the data at `src` as ", stringify!($ty),
                " into `dst`, updating `dst_len` with the bytes written.")]
            ///
            /// `dst_len` holds the capacity of `dst` on entry and is left untouched on failure.
            ///
            /// # Safety
            /// `src` must point to `src_len` readable bytes, `dst_len` must be a valid writable
            /// pointer, and `dst` must point to `*dst_len` writable bytes.
            #[no_mangle]
            pub unsafe extern "C" fn [<squish64_ $fmt _compress>](
                dst_len: *mut usize,
                dst: *mut u8,
                src_len: usize,
                src: *const u8,
            ) -> SquishError {
                if dst_len.is_null() || dst.is_null() || src.is_null() {
                    return SquishError::NullPointer;
                }

                let src = core::slice::from_raw_parts(src, src_len);
                let dst = core::slice::from_raw_parts_mut(dst, *dst_len);
                match <$ty>::compress(src, dst) {
                    Ok(written) => {
                        *dst_len = written;
                        SquishError::Okay
                    }
                    Err(error) => error.into(),
                }
            }
        }
    };
}

squish64_format_abi!(yaz0, Yaz0);
squish64_format_abi!(yay0, Yay0);
squish64_format_abi!(mio0, Mio0);

/// Puts an upper bound for the size of gzip-compressing `src_len` bytes into `dst_size`.
///
/// # Safety
/// `src` must be non-null, and `dst_size` must be a valid writable pointer.
#[no_mangle]
pub unsafe extern "C" fn squish64_gzip_compress_bound(
    dst_size: *mut usize,
    src_len: usize,
    src: *const u8,
) -> SquishError {
    if dst_size.is_null() || src.is_null() {
        return SquishError::NullPointer;
    }

    *dst_size = Gzip::worst_possible_size(src_len);
    SquishError::Okay
}

/// Compresses the data at `src` into a complete gzip stream in `dst`, updating `dst_len` with the
/// bytes written.
///
/// `level` must be between 4 and 9; `small_mem` makes the encoder emit compressed blocks more
/// often. `dst_len` holds the capacity of `dst` on entry and is left untouched on failure.
///
/// # Safety
/// `src` must point to `src_len` readable bytes, `dst_len` must be a valid writable pointer, and
/// `dst` must point to `*dst_len` writable bytes.
#[no_mangle]
pub unsafe extern "C" fn squish64_gzip_compress(
    dst_len: *mut usize,
    dst: *mut u8,
    src_len: usize,
    src: *const u8,
    level: i32,
    small_mem: bool,
) -> SquishError {
    if dst_len.is_null() || dst.is_null() || src.is_null() {
        return SquishError::NullPointer;
    }

    let Ok(level) = u32::try_from(level) else {
        return SquishError::InvalidCompressionLevel;
    };

    let src = core::slice::from_raw_parts(src, src_len);
    let dst = core::slice::from_raw_parts_mut(dst, *dst_len);
    match Gzip::compress(src, dst, level, small_mem) {
        Ok(written) => {
            *dst_len = written;
            SquishError::Okay
        }
        Err(error) => error.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_abi_stable() {
        assert_eq!(i32::from(SquishError::Okay), 0);
        assert_eq!(i32::from(SquishError::InvalidYay0Header), 1);
        assert_eq!(i32::from(SquishError::InvalidYaz0Header), 2);
        assert_eq!(i32::from(SquishError::InvalidMio0Header), 3);
        assert_eq!(i32::from(SquishError::UnsupportedCompressionType), 4);
        assert_eq!(i32::from(SquishError::UnalignedRead), 5);
        assert_eq!(i32::from(SquishError::ByteConversion), 6);
        assert_eq!(i32::from(SquishError::OutOfBounds), 7);
        assert_eq!(i32::from(SquishError::NullPointer), 8);
        assert_eq!(i32::from(SquishError::InvalidCompressionLevel), 9);
        assert_eq!(i32::from(SquishError::Vpk0), 10);

        assert_eq!(SquishError::try_from(7), Ok(SquishError::OutOfBounds));
        assert!(SquishError::try_from(11).is_err());
    }

    #[test]
    fn null_pointers_are_rejected_first() {
        let mut size = 0usize;
        unsafe {
            assert_eq!(
                squish64_yaz0_decompress_bound(core::ptr::null_mut(), 0, [0].as_ptr()),
                SquishError::NullPointer
            );
            assert_eq!(
                squish64_yaz0_decompress_bound(&mut size, 0, core::ptr::null()),
                SquishError::NullPointer
            );
            assert_eq!(
                squish64_gzip_compress(
                    &mut size,
                    core::ptr::null_mut(),
                    0,
                    [0].as_ptr(),
                    9,
                    false
                ),
                SquishError::NullPointer
            );
        }
    }

    // Mirrors how the C test harness drives the library: ask for a bound, allocate, then run.
    fn compress_decompress_cycle(
        input: &[u8],
        compress_bound: unsafe extern "C" fn(*mut usize, usize, *const u8) -> SquishError,
        compress: unsafe extern "C" fn(*mut usize, *mut u8, usize, *const u8) -> SquishError,
        decompress_bound: unsafe extern "C" fn(*mut usize, usize, *const u8) -> SquishError,
        decompress: unsafe extern "C" fn(*mut usize, *mut u8, usize, *const u8) -> SquishError,
    ) {
        unsafe {
            let mut compressed_size = 0usize;
            assert_eq!(
                compress_bound(&mut compressed_size, input.len(), input.as_ptr()),
                SquishError::Okay
            );

            let mut compressed = vec![0u8; compressed_size];
            let mut compressed_len = compressed.len();
            assert_eq!(
                compress(
                    &mut compressed_len,
                    compressed.as_mut_ptr(),
                    input.len(),
                    input.as_ptr()
                ),
                SquishError::Okay
            );
            assert!(compressed_len <= compressed_size);

            let mut decompressed_size = 0usize;
            assert_eq!(
                decompress_bound(&mut decompressed_size, compressed_len, compressed.as_ptr()),
                SquishError::Okay
            );
            assert_eq!(decompressed_size, input.len());

            let mut decompressed = vec![0u8; decompressed_size];
            let mut decompressed_len = decompressed.len();
            assert_eq!(
                decompress(
                    &mut decompressed_len,
                    decompressed.as_mut_ptr(),
                    compressed_len,
                    compressed.as_ptr()
                ),
                SquishError::Okay
            );
            assert_eq!(decompressed_len, input.len());
            assert_eq!(decompressed, input);
        }
    }

    #[test]
    fn yaz0_cycle_through_the_abi() {
        compress_decompress_cycle(
            b"so long-a Bowser! so long-a Bowser!",
            squish64_yaz0_compress_bound,
            squish64_yaz0_compress,
            squish64_yaz0_decompress_bound,
            squish64_yaz0_decompress,
        );
    }

    #[test]
    fn yay0_cycle_through_the_abi() {
        compress_decompress_cycle(
            b"so long-a Bowser! so long-a Bowser!",
            squish64_yay0_compress_bound,
            squish64_yay0_compress,
            squish64_yay0_decompress_bound,
            squish64_yay0_decompress,
        );
    }

    #[test]
    fn mio0_cycle_through_the_abi() {
        compress_decompress_cycle(
            b"so long-a Bowser! so long-a Bowser!",
            squish64_mio0_compress_bound,
            squish64_mio0_compress,
            squish64_mio0_decompress_bound,
            squish64_mio0_decompress,
        );
    }

    #[test]
    fn header_errors_name_the_format() {
        let yaz0 = Yaz0::compress_from(b"A").unwrap();
        let mut size = 0usize;
        unsafe {
            assert_eq!(
                squish64_yay0_decompress_bound(&mut size, yaz0.len(), yaz0.as_ptr()),
                SquishError::InvalidYay0Header
            );
            assert_eq!(
                squish64_mio0_decompress_bound(&mut size, yaz0.len(), yaz0.as_ptr()),
                SquishError::InvalidMio0Header
            );
            assert_eq!(
                squish64_yaz0_decompress_bound(&mut size, 4, yaz0.as_ptr()),
                SquishError::OutOfBounds
            );
        }
    }

    #[test]
    fn failed_decompress_leaves_dst_len_untouched() {
        let compressed = Yaz0::compress_from(b"AAAAAAAAAAAAAAAA").unwrap();
        let mut output = [0u8; 8];
        let mut output_len = output.len();
        unsafe {
            assert_eq!(
                squish64_yaz0_decompress(
                    &mut output_len,
                    output.as_mut_ptr(),
                    compressed.len(),
                    compressed.as_ptr()
                ),
                SquishError::OutOfBounds
            );
        }
        assert_eq!(output_len, 8);
    }

    #[test]
    fn gzip_level_is_validated() {
        let mut output = [0u8; 0x100];
        let mut output_len = output.len();
        unsafe {
            assert_eq!(
                squish64_gzip_compress(
                    &mut output_len,
                    output.as_mut_ptr(),
                    1,
                    [0].as_ptr(),
                    3,
                    false
                ),
                SquishError::InvalidCompressionLevel
            );
            assert_eq!(
                squish64_gzip_compress(
                    &mut output_len,
                    output.as_mut_ptr(),
                    1,
                    [0].as_ptr(),
                    -1,
                    false
                ),
                SquishError::InvalidCompressionLevel
            );
            assert_eq!(
                squish64_gzip_compress(
                    &mut output_len,
                    output.as_mut_ptr(),
                    1,
                    [0].as_ptr(),
                    9,
                    false
                ),
                SquishError::Okay
            );
        }
        assert!(output_len < output.len());
    }
}
