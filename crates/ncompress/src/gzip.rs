//! gzip compression support, as used by the N64-era compiler toolchains for ROM payloads.
//!
//! Unlike the Nintendo formats in this crate there is no custom bitstream here; this module is a
//! thin wrapper over DEFLATE (via [`flate2`]) that pins down the two knobs those toolchains
//! expose: the compression level (4 through 9) and a "small memory" mode that forces compressed
//! blocks to be emitted at fixed intervals instead of letting the encoder buffer freely.
//!
//! The output is a complete gzip stream, header and footer included.

use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use snafu::prelude::*;

/// Error conditions for when writing gzip streams
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// Thrown if the requested compression level is outside the supported range.
    #[snafu(display("Compression level must be between 4 and 9!"))]
    InvalidLevel,

    /// Thrown if the output buffer cannot hold the compressed stream.
    #[snafu(display("Unexpected End-Of-File!"))]
    EndOfFile,

    /// Thrown if the underlying DEFLATE encoder fails.
    #[snafu(display("DEFLATE stream error: {source}"))]
    Deflate { source: std::io::Error },
}
type Result<T> = core::result::Result<T, Error>;

/// Utility struct for handling gzip compression.
pub struct Gzip;

impl Gzip {
    /// How much input is fed to the encoder between flushes in small-memory mode.
    const FLUSH_INTERVAL: usize = 0x8000;

    /// Calculates the filesize for the largest possible stream that gzip compression can produce.
    ///
    /// Incompressible data degrades to stored DEFLATE blocks, so the overhead stays well under
    /// 0.1% plus the fixed header and footer; this rounds that up generously.
    #[must_use]
    #[inline]
    pub const fn worst_possible_size(input_len: usize) -> usize {
        input_len + input_len / 1000 + 0x80
    }

    /// Compresses the input data and returns the compressed stream.
    ///
    /// `small_mem` trades ratio for peak memory by flushing the encoder every 0x8000 bytes,
    /// which emits compressed blocks more often.
    ///
    /// # Examples
    /// ```
    /// # use squish64_ncompress::prelude::*;
    /// let output = Gzip::compress_from(b"you must defeat Sheng Long", 9, false)?;
    /// // gzip magic plus the DEFLATE method byte
    /// assert_eq!(output[..3], [0x1F, 0x8B, 0x08]);
    /// # Ok::<(), gzip::Error>(())
    /// ```
    ///
    /// # Errors
    /// Returns [`InvalidLevel`](Error::InvalidLevel) if `level` is outside 4..=9.
    #[inline]
    pub fn compress_from(input: &[u8], level: u32, small_mem: bool) -> Result<Box<[u8]>> {
        // Levels below 4 selected a different, unported algorithm in the original tool
        ensure!((4..=9).contains(&level), InvalidLevelSnafu);

        let buffer = Vec::with_capacity(Self::worst_possible_size(input.len()));
        let mut encoder = GzEncoder::new(buffer, Compression::new(level));

        if small_mem {
            for chunk in input.chunks(Self::FLUSH_INTERVAL) {
                encoder.write_all(chunk).context(DeflateSnafu)?;
                encoder.flush().context(DeflateSnafu)?;
            }
        } else {
            encoder.write_all(input).context(DeflateSnafu)?;
        }

        Ok(encoder.finish().context(DeflateSnafu)?.into_boxed_slice())
    }

    /// Compresses the input data into the output buffer, and returns the number of bytes written.
    ///
    /// # Errors
    /// Returns [`InvalidLevel`](Error::InvalidLevel) if `level` is outside 4..=9, or
    /// [`EndOfFile`](Error::EndOfFile) if the output buffer cannot hold the compressed stream.
    #[inline]
    pub fn compress(input: &[u8], output: &mut [u8], level: u32, small_mem: bool) -> Result<usize> {
        let data = Self::compress_from(input, level, small_mem)?;

        ensure!(data.len() <= output.len(), EndOfFileSnafu);
        output[..data.len()].copy_from_slice(&data);

        Ok(data.len())
    }
}
