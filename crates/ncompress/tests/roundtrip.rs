//! Round-trip and invariant coverage across all three container formats.

use rand::prelude::*;
use squish64_ncompress::prelude::*;

// Generate random data of the specified size
fn generate_random_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    let mut data = Vec::with_capacity(size);
    for _ in 0..size {
        data.push(rng.gen::<u8>());
    }
    data
}

// Generate repeating pattern data of the specified size
fn generate_pattern_data(size: usize) -> Vec<u8> {
    let pattern = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut data = Vec::with_capacity(size);
    while data.len() < size {
        data.extend_from_slice(pattern);
    }
    data.truncate(size);
    data
}

// Runs of random length, so the match finder sees both short and extension-byte lookbacks
fn generate_run_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    let mut data = Vec::with_capacity(size);
    while data.len() < size {
        let value = rng.gen::<u8>();
        let run = rng.gen_range(1..0x180);
        data.extend(core::iter::repeat(value).take(run));
    }
    data.truncate(size);
    data
}

fn sample_inputs() -> Vec<Vec<u8>> {
    vec![
        Vec::new(),
        vec![0x42],
        b"AAAAAAAA".to_vec(),
        b"ABABABAB".to_vec(),
        vec![0x5A; 19],
        generate_pattern_data(0x40),
        generate_pattern_data(0x1000),
        generate_run_data(0x4000),
        generate_random_data(0x400),
        // Larger than the sliding window, so matches have to respect the distance cap
        generate_pattern_data(0x5000),
        generate_random_data(0x5000),
    ]
}

macro_rules! format_round_trip {
    ($name:ident, $ty:ty) => {
        #[test]
        fn $name() {
            for input in sample_inputs() {
                let compressed = <$ty>::compress_from(&input).unwrap();
                assert!(
                    compressed.len() <= <$ty>::worst_possible_size(input.len()),
                    "compressed {} bytes past the bound for {} input bytes",
                    compressed.len(),
                    input.len()
                );

                let header = <$ty>::read_header(&compressed).unwrap();
                assert_eq!(header.decompressed_size as usize, input.len());

                let decompressed = <$ty>::decompress_from(&compressed).unwrap();
                assert_eq!(*decompressed, *input);
            }
        }
    };
}

format_round_trip!(yaz0_round_trips, Yaz0);
format_round_trip!(yay0_round_trips, Yay0);
format_round_trip!(mio0_round_trips, Mio0);

#[test]
fn identical_input_compresses_identically_across_split_formats() {
    let input = generate_pattern_data(0x800);
    let yay0 = Yay0::compress_from(&input).unwrap();
    let mio0 = Mio0::compress_from(&input).unwrap();
    assert_eq!(yay0[4..], mio0[4..]);
}

#[test]
fn undersized_output_never_gets_written_past() {
    let input = generate_pattern_data(0x200);

    let compressed = Yaz0::compress_from(&input).unwrap();
    let mut output = vec![0u8; input.len() - 1];
    assert!(Yaz0::decompress(&compressed, &mut output).is_err());

    let compressed = Yay0::compress_from(&input).unwrap();
    assert!(Yay0::decompress(&compressed, &mut output).is_err());

    let compressed = Mio0::compress_from(&input).unwrap();
    assert!(Mio0::decompress(&compressed, &mut output).is_err());
}

#[test]
fn split_sections_are_word_aligned_with_zero_padding() {
    for input in sample_inputs() {
        let compressed = Yay0::compress_from(&input).unwrap();
        let header = Yay0::read_header(&compressed).unwrap();

        assert_eq!(compressed.len() % 4, 0);
        assert_eq!(header.lookback_offset % 4, 0);
        assert_eq!(header.copy_data_offset % 4, 0);
    }
}

#[cfg(feature = "gzip")]
#[test]
fn gzip_round_trips_through_flate2() {
    use std::io::Read;

    for input in sample_inputs() {
        let compressed = Gzip::compress_from(&input, 9, false).unwrap();
        assert!(compressed.len() <= Gzip::worst_possible_size(input.len()));

        let mut decompressed = Vec::new();
        flate2::read::GzDecoder::new(&compressed[..])
            .read_to_end(&mut decompressed)
            .unwrap();
        assert_eq!(decompressed, input);
    }
}
