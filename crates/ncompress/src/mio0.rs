//! Adds support for the MIO0 compression format used by the earliest first-party N64 games.
//!
//! MIO0 is the direct predecessor of Yay0 and shares its entire on-disk layout: a 16-byte header
//! (output size, lookback section offset, copy data section offset) followed by the three
//! sections, each aligned to a 4 byte boundary. The only difference between the two formats is
//! the magic number, so see the [Yay0 module documentation](crate::yay0) for the layout and the
//! decompression walkthrough.

use snafu::prelude::*;
use squish64_core::prelude::*;

#[cfg(not(feature = "std"))]
use crate::no_std::*;

use crate::split;
pub use crate::split::Header;

/// Error conditions for when reading/writing MIO0 files
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// Thrown if an error occurs when trying to read or write data.
    #[snafu(transparent)]
    DataError { source: data::Error },

    /// Thrown if reading/writing tries to go out of bounds.
    #[snafu(display("Unexpected End-Of-File!"))]
    EndOfFile,

    /// Thrown if the file is larger than u32::MAX since the header cannot store it.
    #[snafu(display("File too large to fit into u32::MAX!"))]
    FileTooBig,

    /// Thrown if the header contains a magic number other than "MIO0".
    #[snafu(display("Invalid Magic! Expected {:?}.", Mio0::MAGIC))]
    InvalidMagic,

    /// Thrown if a header section offset is not on a 4 byte boundary.
    #[snafu(display("Section offset is not aligned to 4 bytes!"))]
    UnalignedSection,
}
type Result<T> = core::result::Result<T, Error>;

impl From<split::Error> for Error {
    #[inline]
    fn from(error: split::Error) -> Self {
        match error {
            split::Error::DataError { source } => Self::DataError { source },
            split::Error::EndOfFile => Self::EndOfFile,
            split::Error::FileTooBig => Self::FileTooBig,
            split::Error::InvalidMagic => Self::InvalidMagic,
            split::Error::UnalignedSection => Self::UnalignedSection,
        }
    }
}

/// Utility struct for handling MIO0 compression.
///
/// MIO0 is stateless, and is merely a namespace for implementing certain traits.
pub struct Mio0;

impl Mio0 {
    /// Unique identifier that tells us if we're reading a MIO0-compressed file
    pub const MAGIC: [u8; 4] = *b"MIO0";

    /// Returns the metadata from a MIO0 header.
    ///
    /// # Errors
    /// Returns [`InvalidMagic`](Error::InvalidMagic) if the header does not match a MIO0 file,
    /// [`UnalignedSection`](Error::UnalignedSection) if a section offset is misaligned, or
    /// [`EndOfFile`](Error::EndOfFile) if a section offset lands outside the input.
    #[inline]
    pub fn read_header(data: &[u8]) -> Result<Header> {
        Ok(split::read_header(data, Self::MAGIC)?)
    }

    /// Calculates the filesize for the largest possible file that can be created with MIO0
    /// compression.
    #[must_use]
    #[inline]
    pub const fn worst_possible_size(input_len: usize) -> usize {
        split::worst_possible_size(input_len)
    }

    /// Decompresses a MIO0 file and returns the decompressed data.
    ///
    /// # Examples
    /// ```
    /// # use squish64_ncompress::prelude::*;
    /// let input = b"It's-a me! It's-a me! It's-a me!";
    /// let compressed = Mio0::compress_from(input)?;
    /// let output = Mio0::decompress_from(&compressed)?;
    /// assert_eq!(*output, *input.as_slice());
    /// # Ok::<(), mio0::Error>(())
    /// ```
    ///
    /// # Errors
    /// Returns [`InvalidMagic`](Error::InvalidMagic) if the header does not match a MIO0 file, or
    /// [`EndOfFile`](Error::EndOfFile) if trying to read or write out of bounds.
    #[inline]
    pub fn decompress_from(data: &[u8]) -> Result<Box<[u8]>> {
        let header = Self::read_header(data)?;

        // Allocate the decompression buffer
        let mut output = vec![0u8; header.decompressed_size as usize].into_boxed_slice();

        // Perform the actual decompression
        Self::decompress(data, &mut output)?;

        Ok(output)
    }

    /// Decompresses a MIO0 input file into the output buffer, and returns the number of bytes
    /// written.
    ///
    /// # Errors
    /// Returns [`InvalidMagic`](Error::InvalidMagic) if the header does not match a MIO0 file, or
    /// [`EndOfFile`](Error::EndOfFile) if trying to read or write out of bounds.
    #[inline]
    pub fn decompress(input: &[u8], output: &mut [u8]) -> Result<usize> {
        let header = Self::read_header(input)?;
        Ok(split::decompress(input, output, &header)?)
    }

    /// Compresses the input data and returns the compressed data.
    ///
    /// # Errors
    /// Returns [`FileTooBig`](Error::FileTooBig) if the input is too large for the filesize to be
    /// stored in the header.
    #[inline]
    pub fn compress_from(input: &[u8]) -> Result<Box<[u8]>> {
        let mut output = vec![0u8; Self::worst_possible_size(input.len())];

        let output_size = Self::compress(input, &mut output)?;

        output.truncate(output_size);

        Ok(output.into_boxed_slice())
    }

    /// Compresses the input data into the output buffer, and returns the number of bytes written.
    ///
    /// # Errors
    /// Returns [`FileTooBig`](Error::FileTooBig) if the input is too large for the filesize to be
    /// stored in the header, or [`EndOfFile`](Error::EndOfFile) if the output buffer cannot hold
    /// the compressed data.
    #[inline]
    pub fn compress(input: &[u8], output: &mut [u8]) -> Result<usize> {
        Ok(split::compress(Self::MAGIC, input, output)?)
    }
}

#[cfg(feature = "std")]
impl FileIdentifier for Mio0 {
    fn identify(data: &[u8]) -> Option<FileInfo> {
        Self::read_header(data).ok().map(|header| {
            let info = format!(
                "Nintendo MIO0-compressed file, decompressed size: {}",
                util::format_size(header.decompressed_size as usize)
            );
            FileInfo::new(info, None)
        })
    }

    fn identify_deep(data: &[u8]) -> Option<FileInfo> {
        Self::read_header(data).ok().map(|header| {
            let info = format!(
                "Nintendo MIO0-compressed file, decompressed size: {}",
                util::format_size(header.decompressed_size as usize)
            );
            let payload = Self::decompress_from(data).ok();
            FileInfo::new(info, payload)
        })
    }
}
