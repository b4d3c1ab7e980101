//! Adds support for the Yaz0 compression format used for N64, GameCube, Wii, Wii U, and Switch.
//!
//! Because the Yaz0 format is so lightweight, this module is designed to not have any persistence.
//! It takes in data, and will return the de/compressed data contained inside.
//!
//! # Format
//! The Yaz0 format is part of the [Lempel-Ziv family of algorithms](https://w.wiki/F6n), which use
//! a "sliding window" to allow for copying repetitive data from previously in the output buffer.
//! The input stream consists of lookback+length pairs, unique bytes to copy, and "flag bytes" which
//! determine which of the two operations to do.
//!
//! # Header
//! The header is as follows, in big-endian format:
//!
//! | Offset | Field | Type | Notes |
//! |--------|-------|------|-------|
//! | 0x0 | Magic number | u8\[4\] | Unique identifier ("Yaz0") to let us know we're reading a Yaz0-compressed file. |
//! | 0x4 | Output size  | u32     | The size of the decompressed data, needed for the output buffer. |
//! | 0x8 | Alignment    | u32     | Specifies the alignment needed for the output buffer. Non-zero starting with Wii U. |
//! | 0xC | Padding      | u8\[4\] | Alignment to a 0x10 byte boundary. Always 0. |
//!
//! # Decompression
//! The decompression algorithm is as follows, ran in a loop until you write enough bytes to fill
//! the output buffer:
//!
//! * Read one byte from the input, which is 8 flag bits from high to low.
//! * For each flag bit, if it is a 1, copy one byte from the input to the output.
//! * If it is a 0, copy bytes from earlier in the output buffer:
//!     * Read two bytes from the input.
//!     * Get the first nibble (code >> 12). If it is 0, read one more byte and add 18 (0x12).
//!       Otherwise, add 2 to the nibble. Use that as the number of bytes to copy.
//!     * Add 1 to the lower nibbles (code & 0xFFF) and treat that as how far back in the buffer to
//!       read, from the current position.
//!     * **Note that the count can overlap with the destination, and needs to be copied one byte at
//!       a time for correct behavior.**
//!     * Copy that amount of bytes from the lookback position to the current position.
//!
//! # Usage
//! This module offers the following functionality:
//! ## Decompression
//! * [`decompress_from`](Yaz0::decompress_from): Provide the input data, get decompressed data back
//! * [`decompress`](Yaz0::decompress): Provide the input data and output buffer, run the
//!   decompression algorithm
//! ## Compression
//! * [`compress_from`](Yaz0::compress_from): Provide the input data, get compressed data back
//! * [`compress`](Yaz0::compress): Provide the input data and output buffer, run the compression
//!   algorithm
//! ## Utilities
//! * [`read_header`](Yaz0::read_header): Returns the header information for a given Yaz0 file
//! * [`worst_possible_size`](Yaz0::worst_possible_size): Calculates the worst possible compression
//!   size for a given filesize

use snafu::prelude::*;
use squish64_core::prelude::*;

#[cfg(not(feature = "std"))]
use crate::no_std::*;

use crate::codec::{self, Token};

/// Error conditions for when reading/writing Yaz0 files
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

    /// Thrown if the header contains a magic number other than "Yaz0".
    #[snafu(display("Invalid Magic! Expected {:?}.", Yaz0::MAGIC))]
    InvalidMagic,
}
type Result<T> = core::result::Result<T, Error>;

/// See the module [header](self#header) for more information.
pub struct Header {
    pub decompressed_size: u32,
    pub alignment: u32,
}

/// Utility struct for handling Yaz0 compression.
///
/// Yaz0 is stateless, and is merely a namespace for implementing certain traits.
///
/// See the [module documentation](self) for more information.
pub struct Yaz0;

impl Yaz0 {
    /// Unique identifier that tells us if we're reading a Yaz0-compressed file
    pub const MAGIC: [u8; 4] = *b"Yaz0";

    /// Returns the metadata from a Yaz0 header.
    ///
    /// # Examples
    /// ```
    /// # use squish64_ncompress::prelude::*;
    /// let input = Yaz0::compress_from(&[0u8; 0x100])?;
    /// let header = Yaz0::read_header(&input)?;
    /// assert_eq!(header.decompressed_size, 0x100);
    /// assert_eq!(header.alignment, 0);
    /// # Ok::<(), yaz0::Error>(())
    /// ```
    ///
    /// # Errors
    /// Returns [`InvalidMagic`](Error::InvalidMagic) if the header does not match a Yaz0 file, or
    /// [`EndOfFile`](Error::EndOfFile) if the input is too short to hold a header.
    #[inline]
    pub fn read_header(data: &[u8]) -> Result<Header> {
        // Make sure we have enough data to actually check a header
        ensure!(data.len() >= 0x10, EndOfFileSnafu);

        let mut data = DataCursorRef::new(data, Endian::Big);
        ensure!(data.get_slice(4)? == Self::MAGIC, InvalidMagicSnafu);

        let decompressed_size = data.read_u32()?;
        // Zero on everything before the Wii U
        let alignment = data.read_u32()?;

        Ok(Header { decompressed_size, alignment })
    }

    /// Calculates the filesize for the largest possible file that can be created with Yaz0
    /// compression.
    ///
    /// This consists of the 0x10 header, the length of the input file, and all flag bits needed,
    /// rounded up.
    #[must_use]
    #[inline]
    pub const fn worst_possible_size(input_len: usize) -> usize {
        0x10 + input_len + input_len.div_ceil(8)
    }

    /// Decompresses a Yaz0 file and returns the decompressed data.
    ///
    /// # Examples
    /// ```
    /// # use squish64_ncompress::prelude::*;
    /// let input = b"Hey! Hey! Hey! Listen!";
    /// let compressed = Yaz0::compress_from(input)?;
    /// let output = Yaz0::decompress_from(&compressed)?;
    /// assert_eq!(*output, *input.as_slice());
    /// # Ok::<(), yaz0::Error>(())
    /// ```
    ///
    /// # Errors
    /// Returns [`InvalidMagic`](Error::InvalidMagic) if the header does not match a Yaz0 file, or
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

    /// Decompresses a Yaz0 input file into the output buffer, and returns the number of bytes
    /// written.
    ///
    /// The header's stored output size is validated against the buffer before anything is written,
    /// and every lookback is checked against the data written so far, so a corrupt file cannot
    /// read or write outside the two buffers.
    ///
    /// # Errors
    /// Returns [`InvalidMagic`](Error::InvalidMagic) if the header does not match a Yaz0 file, or
    /// [`EndOfFile`](Error::EndOfFile) if trying to read or write out of bounds.
    #[inline]
    pub fn decompress(input: &[u8], output: &mut [u8]) -> Result<usize> {
        let header = Self::read_header(input)?;
        let decompressed_size = header.decompressed_size as usize;

        // The stored size has to be checked up front, so a forged header can't run us past the
        // output buffer
        ensure!(decompressed_size <= output.len(), EndOfFileSnafu);

        let mut input = DataCursorRef::new(input, Endian::Big);
        input.set_position(0x10);
        let mut output = DataCursorMut::new(&mut output[..decompressed_size], Endian::Big);

        let mut mask = 0u8;
        let mut flags = 0u8;

        while !output.is_empty() {
            // Check if we need a new flag byte
            if mask == 0 {
                flags = input.read_u8()?;
                mask = 1 << 7;
            }

            // Check what kind of copy we're doing
            if (flags & mask) != 0 {
                // Copy one byte from the input stream
                output.write_u8(input.read_u8()?)?;
            } else {
                // Copy a run from previously in the output buffer
                let code = input.read_u16()?;

                let lookback = usize::from(code & 0xFFF) + 1;
                let size = match code >> 12 {
                    0 => usize::from(input.read_u8()?) + 0x12,
                    n => usize::from(n) + 2,
                };

                // A run can never reach back past the start of the output
                let position = output.position();
                ensure!(lookback <= position, EndOfFileSnafu);
                output.copy_within(position - lookback, size)?;
            }

            mask >>= 1;
        }

        Ok(decompressed_size)
    }

    /// Compresses the input data and returns the compressed data.
    ///
    /// # Examples
    /// ```
    /// # use squish64_ncompress::prelude::*;
    /// let output = Yaz0::compress_from(&[0u8; 0x40])?;
    /// assert!(output.len() <= Yaz0::worst_possible_size(0x40));
    /// # Ok::<(), yaz0::Error>(())
    /// ```
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
    /// The body interleaves each flag byte with the tokens it controls, in the order they were
    /// produced.
    ///
    /// # Errors
    /// Returns [`FileTooBig`](Error::FileTooBig) if the input is too large for the filesize to be
    /// stored in the header, or [`EndOfFile`](Error::EndOfFile) if the output buffer cannot hold
    /// the compressed data.
    #[inline]
    pub fn compress(input: &[u8], output: &mut [u8]) -> Result<usize> {
        ensure!(u32::try_from(input.len()).is_ok(), FileTooBigSnafu);

        let mut output = DataCursorMut::new(output, Endian::Big);
        output.write_length(&Self::MAGIC)?;
        output.write_u32(input.len() as u32)?;
        // No alignment, and padding up to the 0x10 boundary
        output.write_u32(0)?;
        output.write_u32(0)?;

        for group in codec::tokenize(input).chunks(8) {
            output.write_u8(codec::flag_byte(group))?;
            for token in group {
                match *token {
                    Token::Literal(value) => output.write_u8(value)?,
                    Token::BackRef { distance, length } => {
                        let (code, extension) = codec::encode_backref(distance, length);
                        output.write_length(&code)?;
                        if let Some(extension) = extension {
                            output.write_u8(extension)?;
                        }
                    }
                }
            }
        }

        Ok(output.position())
    }
}

#[cfg(feature = "std")]
impl FileIdentifier for Yaz0 {
    fn identify(data: &[u8]) -> Option<FileInfo> {
        Self::read_header(data).ok().map(|header| {
            let info = format!(
                "Nintendo Yaz0-compressed file, decompressed size: {}",
                util::format_size(header.decompressed_size as usize)
            );
            FileInfo::new(info, None)
        })
    }

    fn identify_deep(data: &[u8]) -> Option<FileInfo> {
        Self::read_header(data).ok().map(|header| {
            let info = format!(
                "Nintendo Yaz0-compressed file, decompressed size: {}",
                util::format_size(header.decompressed_size as usize)
            );
            let payload = Self::decompress_from(data).ok();
            FileInfo::new(info, payload)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_a_bare_header() {
        let output = Yaz0::compress_from(b"").unwrap();
        assert_eq!(
            *output,
            [b'Y', b'a', b'z', b'0', 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
        );
        assert!(Yaz0::decompress_from(&output).unwrap().is_empty());
    }

    #[test]
    fn single_run_layout() {
        let output = Yaz0::compress_from(b"AAAAAAAA").unwrap();
        assert_eq!(output.len(), 20);
        // One flag byte, a literal, then a two-byte run of distance 1, length 7
        assert_eq!(output[0x10..], [0b1000_0000, 0x41, 0x50, 0x00]);
    }

    #[test]
    fn alternating_run_layout() {
        let output = Yaz0::compress_from(b"ABABABAB").unwrap();
        assert_eq!(output[0x10..], [0b1100_0000, 0x41, 0x42, 0x40, 0x01]);
    }

    #[test]
    fn long_runs_use_the_extension_byte() {
        let output = Yaz0::compress_from(&[0x5A; 19]).unwrap();
        assert_eq!(output[0x10..], [0b1000_0000, 0x5A, 0x00, 0x00, 0x00]);
        assert_eq!(*Yaz0::decompress_from(&output).unwrap(), [0x5A; 19]);
    }

    #[test]
    fn overlapping_run_repeats_cyclically() {
        // distance 1, length 5 off a single literal expands to six copies of it
        let mut data = Vec::from(Yaz0::MAGIC);
        data.extend_from_slice(&[0, 0, 0, 6]);
        data.extend_from_slice(&[0; 8]);
        data.extend_from_slice(&[0b1000_0000, 0x41, 0x30, 0x00]);

        assert_eq!(*Yaz0::decompress_from(&data).unwrap(), *b"AAAAAA");
    }

    #[test]
    fn forged_size_fails_before_writing() {
        let mut data = Vec::from(Yaz0::MAGIC);
        data.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0xFF]);
        data.extend_from_slice(&[0; 8]);

        let mut output = [0u8; 0x100];
        assert!(matches!(
            Yaz0::decompress(&data, &mut output),
            Err(Error::EndOfFile)
        ));
        assert!(output.iter().all(|&value| value == 0));
    }

    #[test]
    fn lookback_before_output_start_is_rejected() {
        let mut data = Vec::from(Yaz0::MAGIC);
        data.extend_from_slice(&[0, 0, 0, 4]);
        data.extend_from_slice(&[0; 8]);
        // First token is already a run, but there is nothing to copy from yet
        data.extend_from_slice(&[0b0000_0000, 0x20, 0x00]);

        assert!(Yaz0::decompress_from(&data).is_err());
    }

    #[test]
    fn exact_buffer_fits_and_one_byte_less_does_not() {
        let compressed = Yaz0::compress_from(b"ABABABAB").unwrap();

        let mut exact = [0u8; 8];
        assert_eq!(Yaz0::decompress(&compressed, &mut exact).unwrap(), 8);
        assert_eq!(exact, *b"ABABABAB");

        let mut small = [0u8; 7];
        assert!(matches!(
            Yaz0::decompress(&compressed, &mut small),
            Err(Error::EndOfFile)
        ));
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let data = [0u8; 0x10];
        assert!(matches!(Yaz0::read_header(&data), Err(Error::InvalidMagic)));
        assert!(matches!(Yaz0::read_header(&data[..4]), Err(Error::EndOfFile)));
    }

    #[cfg(feature = "std")]
    #[test]
    fn identifies_compressed_data() {
        let compressed = Yaz0::compress_from(&[0x42; 0x40]).unwrap();
        let info = Yaz0::identify_deep(&compressed).unwrap();
        assert!(info.info.contains("Yaz0"));
        assert_eq!(*info.payload.unwrap(), [0x42; 0x40]);
    }

    #[test]
    fn compressed_size_stays_under_the_bound() {
        let input: Vec<u8> = (0u16..0x300).map(|value| (value % 0xFF) as u8).collect();
        let compressed = Yaz0::compress_from(&input).unwrap();
        assert!(compressed.len() <= Yaz0::worst_possible_size(input.len()));
        assert_eq!(*Yaz0::decompress_from(&compressed).unwrap(), *input);
    }
}
