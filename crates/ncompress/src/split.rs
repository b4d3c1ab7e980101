//! Shared implementation of the split-section container layout.
//!
//! Yay0 and MIO0 are byte-identical apart from their magic number: a 16-byte header followed by
//! three separately-located sections (flag bytes, lookback pairs, copy data), each padded with
//! zeros to a 4-byte boundary. Everything here is parameterised over the magic so the two format
//! modules stay thin.

use snafu::prelude::*;
use squish64_core::prelude::*;

#[cfg(not(feature = "std"))]
use crate::no_std::*;

use crate::codec::{self, Token};

/// Section layout metadata parsed from a split-format header.
pub struct Header {
    pub decompressed_size: u32,
    pub lookback_offset: u32,
    pub copy_data_offset: u32,
}

/// Internal error conditions, mapped onto each format's own error type.
#[derive(Debug, Snafu)]
pub(crate) enum Error {
    #[snafu(transparent)]
    DataError { source: data::Error },

    #[snafu(display("Unexpected End-Of-File!"))]
    EndOfFile,

    #[snafu(display("File too large to fit into u32::MAX!"))]
    FileTooBig,

    #[snafu(display("Invalid Magic!"))]
    InvalidMagic,

    #[snafu(display("Section offset is not aligned to 4 bytes!"))]
    UnalignedSection,
}
type Result<T> = core::result::Result<T, Error>;

const fn align4(value: usize) -> usize {
    (value + 3) & !3
}

/// Reads and validates a split-format header against the given magic.
pub(crate) fn read_header(input: &[u8], magic: [u8; 4]) -> Result<Header> {
    // Make sure we have enough data to actually check a header
    ensure!(input.len() >= 0x10, EndOfFileSnafu);

    let mut data = DataCursorRef::new(input, Endian::Big);
    ensure!(data.get_slice(4)? == magic, InvalidMagicSnafu);

    let decompressed_size = data.read_u32()?;
    let lookback_offset = data.read_u32()?;
    let copy_data_offset = data.read_u32()?;

    // Both sections have to start past the header, inside the file, on a word boundary
    for offset in [lookback_offset, copy_data_offset] {
        let offset = offset as usize;
        ensure!(offset % 4 == 0, UnalignedSectionSnafu);
        ensure!((0x10..=input.len()).contains(&offset), EndOfFileSnafu);
    }

    Ok(Header { decompressed_size, lookback_offset, copy_data_offset })
}

/// The all-literals worst case for the copy and flag sections, plus slack for aligning the
/// lookback section when one exists.
pub(crate) const fn worst_possible_size(input_len: usize) -> usize {
    0x10 + ((input_len + 3) & !3) + ((input_len.div_ceil(8) + 3) & !3) + 8
}

/// Compresses the input into the three-section layout, and returns the number of bytes written.
pub(crate) fn compress(magic: [u8; 4], input: &[u8], output: &mut [u8]) -> Result<usize> {
    ensure!(u32::try_from(input.len()).is_ok(), FileTooBigSnafu);

    // Accumulate each section separately, since the header needs their final sizes
    let mut flag_data = Vec::with_capacity(input.len().div_ceil(8));
    let mut lookback_data = Vec::with_capacity(input.len() / 2);
    let mut copy_data = Vec::with_capacity(input.len());

    for group in codec::tokenize(input).chunks(8) {
        flag_data.push(codec::flag_byte(group));
        for token in group {
            match *token {
                Token::Literal(value) => copy_data.push(value),
                Token::BackRef { distance, length } => {
                    let (code, extension) = codec::encode_backref(distance, length);
                    lookback_data.extend_from_slice(&code);
                    // The extension byte of a long run lives in the copy section
                    if let Some(extension) = extension {
                        copy_data.push(extension);
                    }
                }
            }
        }
    }

    let lookback_offset = 0x10 + align4(flag_data.len());
    let copy_data_offset = lookback_offset + align4(lookback_data.len());

    let mut output = DataCursorMut::new(output, Endian::Big);
    output.write_length(&magic)?;
    output.write_u32(input.len() as u32)?;
    output.write_u32(lookback_offset as u32)?;
    output.write_u32(copy_data_offset as u32)?;

    // Flush each section, padded with zeros to the next word boundary
    for section in [&flag_data, &lookback_data, &copy_data] {
        output.write_length(section)?;
        for _ in section.len()..align4(section.len()) {
            output.write_u8(0)?;
        }
    }

    Ok(output.position())
}

/// Decompresses a split-format file into the output buffer, and returns the number of bytes
/// written.
pub(crate) fn decompress(input: &[u8], output: &mut [u8], header: &Header) -> Result<usize> {
    let decompressed_size = header.decompressed_size as usize;

    // The stored size has to be checked up front, so a forged header can't run us past the
    // output buffer
    ensure!(decompressed_size <= output.len(), EndOfFileSnafu);

    // Three independent read positions, one per section
    let mut flag_data = DataCursorRef::new(input, Endian::Big);
    flag_data.set_position(0x10);
    let mut lookback_data = DataCursorRef::new(input, Endian::Big);
    lookback_data.set_position(header.lookback_offset as usize);
    let mut copy_data = DataCursorRef::new(input, Endian::Big);
    copy_data.set_position(header.copy_data_offset as usize);

    let mut output = DataCursorMut::new(&mut output[..decompressed_size], Endian::Big);
    let mut mask = 0u8;
    let mut flags = 0u8;

    while !output.is_empty() {
        // Check if we need a new flag byte
        if mask == 0 {
            flags = flag_data.read_u8()?;
            mask = 1 << 7;
        }

        // Check what kind of copy we're doing
        if (flags & mask) != 0 {
            // Copy one byte from the copy section
            output.write_u8(copy_data.read_u8()?)?;
        } else {
            // Copy a run from previously in the output buffer
            let code = lookback_data.read_u16()?;

            let lookback = usize::from(code & 0xFFF) + 1;
            let size = match code >> 12 {
                // The extension byte comes from the copy section, not the lookback one
                0 => usize::from(copy_data.read_u8()?) + 0x12,
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
