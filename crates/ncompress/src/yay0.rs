//! Adds support for the Yay0 compression format used for first-party N64 and early GameCube games.
//!
//! Because the Yay0 format is so lightweight, this module is designed to not have any persistence.
//! It takes in data, and will return the de/compressed data contained inside.
//!
//! # Format
//! The Yay0 format is part of the [Lempel-Ziv family of algorithms](https://w.wiki/F6n), which use
//! a "sliding window" to allow for copying repetitive data from previously in the output buffer.
//! The input is split into three sections. The first contains flag bytes that signal whether to
//! copy from the input or from the output buffer, the second contains all lookback+length pairs,
//! and the third contains all copyable data.
//!
//! ## Header
//! The header is as follows, in big-endian format:
//!
//! | Offset | Field | Type | Notes |
//! |--------|-------|------|-------|
//! | 0x0 | Magic number     | u8\[4] | Unique identifier ("Yay0") to let us know we're reading a Yay0-compressed file. |
//! | 0x4 | Output size      | u32    | The size of the decompressed data, needed for the output buffer. |
//! | 0x8 | Lookback offset  | u32    | Offset to the lookback pair section, from the start of the file. |
//! | 0xC | Copy data offset | u32    | Offset to the copyable data section, from the start of the file. |
//!
//! Both section offsets are aligned to a 4 byte boundary, and each section is padded with zeros up
//! to the next one.
//!
//! # Decompression
//! The decompression algorithm is as follows, ran in a loop until you write enough bytes to fill
//! the output buffer:
//!
//! * Set three pointers, one to header+0x10 for flag data, one to the lookback offset, and one to
//!   the copy data offset.
//! * Read one byte from the flag data, which is 8 flag bits from high to low.
//! * For each flag bit, if it is a 1, copy one byte from the copy data section to the output.
//! * If it is a 0, copy bytes from earlier in the output buffer:
//!     * Read two bytes from the lookback section.
//!     * Get the first nibble (code >> 12). If it is 0, read one byte ***from the copy data
//!       section*** and add 18 (0x12). Otherwise, add 2 to the nibble. Use that as the number of
//!       bytes to copy.
//!     * Add 1 to the lower nibbles (code & 0xFFF) and treat that as how far back in the buffer to
//!       read, from the current position.
//!     * **Note that the count can overlap with the destination, and needs to be copied one byte
//!       at a time for correct behavior.**
//!     * Copy that amount of bytes from the lookback position to the current position.
//!
//! # Usage
//! This module offers the following functionality:
//! ## Decompression
//! * [`decompress_from`](Yay0::decompress_from): Provide the input data, get decompressed data back
//! * [`decompress`](Yay0::decompress): Provide the input data and output buffer, run the
//!   decompression algorithm
//! ## Compression
//! * [`compress_from`](Yay0::compress_from): Provide the input data, get compressed data back
//! * [`compress`](Yay0::compress): Provide the input data and output buffer, run the compression
//!   algorithm
//! ## Utilities
//! * [`read_header`](Yay0::read_header): Returns the header information for a given Yay0 file
//! * [`worst_possible_size`](Yay0::worst_possible_size): Calculates the worst possible compression
//!   size for a given filesize

use snafu::prelude::*;
use squish64_core::prelude::*;

#[cfg(not(feature = "std"))]
use crate::no_std::*;

use crate::split;
pub use crate::split::Header;

/// Error conditions for when reading/writing Yay0 files
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

    /// Thrown if the header contains a magic number other than "Yay0".
    #[snafu(display("Invalid Magic! Expected {:?}.", Yay0::MAGIC))]
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

/// Utility struct for handling Yay0 compression.
///
/// Yay0 is stateless, and is merely a namespace for implementing certain traits.
///
/// See the [module documentation](self) for more information.
pub struct Yay0;

impl Yay0 {
    /// Unique identifier that tells us if we're reading a Yay0-compressed file
    pub const MAGIC: [u8; 4] = *b"Yay0";

    /// Returns the metadata from a Yay0 header.
    ///
    /// # Examples
    /// ```
    /// # use squish64_ncompress::prelude::*;
    /// let input = Yay0::compress_from(b"AAAAAAAA")?;
    /// let header = Yay0::read_header(&input)?;
    /// assert_eq!(header.decompressed_size, 8);
    /// assert_eq!(header.lookback_offset, 0x14);
    /// assert_eq!(header.copy_data_offset, 0x18);
    /// # Ok::<(), yay0::Error>(())
    /// ```
    ///
    /// # Errors
    /// Returns [`InvalidMagic`](Error::InvalidMagic) if the header does not match a Yay0 file,
    /// [`UnalignedSection`](Error::UnalignedSection) if a section offset is misaligned, or
    /// [`EndOfFile`](Error::EndOfFile) if a section offset lands outside the input.
    #[inline]
    pub fn read_header(data: &[u8]) -> Result<Header> {
        Ok(split::read_header(data, Self::MAGIC)?)
    }

    /// Calculates the filesize for the largest possible file that can be created with Yay0
    /// compression.
    ///
    /// This consists of the 0x10 header, the length of the input file, and all flag bits needed,
    /// rounded up, with every section aligned to a 4 byte boundary.
    #[must_use]
    #[inline]
    pub const fn worst_possible_size(input_len: usize) -> usize {
        split::worst_possible_size(input_len)
    }

    /// Decompresses a Yay0 file and returns the decompressed data.
    ///
    /// # Examples
    /// ```
    /// # use squish64_ncompress::prelude::*;
    /// let input = b"Do a barrel roll! Do a barrel roll!";
    /// let compressed = Yay0::compress_from(input)?;
    /// let output = Yay0::decompress_from(&compressed)?;
    /// assert_eq!(*output, *input.as_slice());
    /// # Ok::<(), yay0::Error>(())
    /// ```
    ///
    /// # Errors
    /// Returns [`InvalidMagic`](Error::InvalidMagic) if the header does not match a Yay0 file, or
    /// [`EndOfFile`](Error::EndOfFile) if trying to read or write out of bounds.
    #[inline]
    pub fn decompress_from(data: &[u8]) -> Result<Box<[u8]>> {
        let header = Self::read_header(data)?;

        // Allocate the decompression buffer
        let mut output = vec![0u8; header.decompressed_size as usize].into_boxed_slice();

        // Perform the actual decompression
        Self::decompress(data, &mut output)?;

        // If we've gotten this far, output contains valid decompressed data
        Ok(output)
    }

    /// Decompresses a Yay0 input file into the output buffer, and returns the number of bytes
    /// written.
    ///
    /// The header's stored output size is validated against the buffer before anything is written,
    /// and every lookback is checked against the data written so far, so a corrupt file cannot
    /// read or write outside the two buffers.
    ///
    /// # Errors
    /// Returns [`InvalidMagic`](Error::InvalidMagic) if the header does not match a Yay0 file, or
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
        // Assume 0x10 header, every byte is a copy, and include flag bytes (rounded up)
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
impl FileIdentifier for Yay0 {
    fn identify(data: &[u8]) -> Option<FileInfo> {
        Self::read_header(data).ok().map(|header| {
            let info = format!(
                "Nintendo Yay0-compressed file, decompressed size: {}",
                util::format_size(header.decompressed_size as usize)
            );
            FileInfo::new(info, None)
        })
    }

    fn identify_deep(data: &[u8]) -> Option<FileInfo> {
        Self::read_header(data).ok().map(|header| {
            let info = format!(
                "Nintendo Yay0-compressed file, decompressed size: {}",
                util::format_size(header.decompressed_size as usize)
            );
            let payload = Self::decompress_from(data).ok();
            FileInfo::new(info, payload)
        })
    }
}
