//! WAV container utilities.
//!
//! Generates the standard 44-byte RIFF header with placeholder sizes and
//! provides the helpers used to patch the size fields once the total payload
//! length is known. Every multi-byte field is little-endian regardless of
//! host endianness; the four ASCII tags are literal byte sequences.

/// Size of the standard WAV RIFF header in bytes.
pub const WAV_HEADER_SIZE: usize = 44;

/// Byte offset of the RIFF chunk-size field (`36 + data_size`).
pub const RIFF_SIZE_OFFSET: u64 = 4;

/// Byte offset of the data chunk-size field.
pub const DATA_SIZE_OFFSET: u64 = 40;

/// Generate a 44-byte WAV RIFF header for PCM (format code 1).
///
/// Layout:
/// ```text
/// [0-3]    "RIFF"
/// [4-7]    36 + data_size
/// [8-11]   "WAVE"
/// [12-15]  "fmt "
/// [16-19]  16 (PCM format chunk size)
/// [20-21]  1 (PCM format code)
/// [22-23]  channels
/// [24-27]  sample_rate
/// [28-31]  byte_rate = sample_rate * channels * bits / 8
/// [32-33]  block_align = channels * bits / 8
/// [34-35]  bits_per_sample
/// [36-39]  "data"
/// [40-43]  data_size
/// ```
///
/// Pass `data_size = 0` for the provisional header written before capture;
/// the size fields are patched after the fact via [`riff_chunk_size`] and
/// the offsets above.
pub fn wav_header(sample_rate: u32, bits_per_sample: u16, channels: u16, data_size: u32) -> [u8; WAV_HEADER_SIZE] {
    let byte_rate = sample_rate * channels as u32 * bits_per_sample as u32 / 8;
    let block_align = channels * bits_per_sample / 8;

    let mut header = [0u8; WAV_HEADER_SIZE];

    // outer RIFF container, sized over everything past its own 8 bytes
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&riff_chunk_size(data_size as u64).to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    // format sub-chunk: 16 bytes of linear-PCM description
    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes());
    header[20..22].copy_from_slice(&1u16.to_le_bytes()); // 1 = uncompressed PCM
    header[22..24].copy_from_slice(&channels.to_le_bytes());
    header[24..28].copy_from_slice(&sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    header[32..34].copy_from_slice(&block_align.to_le_bytes());
    header[34..36].copy_from_slice(&bits_per_sample.to_le_bytes());

    // payload sub-chunk; samples follow immediately after the length
    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_size.to_le_bytes());

    header
}

/// RIFF chunk size for a given payload length (`36 + data_size`).
///
/// Saturates at `u32::MAX`: a payload the 32-bit field cannot represent
/// yields a capped size rather than a wrapped one, so the header never
/// claims more data than the file holds.
pub fn riff_chunk_size(data_size: u64) -> u32 {
    data_chunk_size(data_size).saturating_add(36)
}

/// Data chunk size for a given payload length, saturating at `u32::MAX`.
pub fn data_chunk_size(data_size: u64) -> u32 {
    u32::try_from(data_size).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_size_is_44_bytes() {
        let header = wav_header(44100, 16, 1, 0);
        assert_eq!(header.len(), WAV_HEADER_SIZE);
    }

    #[test]
    fn header_riff_magic() {
        let header = wav_header(44100, 16, 1, 0);
        assert_eq!(&header[0..4], b"RIFF");
        assert_eq!(&header[8..12], b"WAVE");
        assert_eq!(&header[12..16], b"fmt ");
        assert_eq!(&header[36..40], b"data");
    }

    #[test]
    fn header_pcm_format() {
        let header = wav_header(44100, 16, 1, 0);
        // Format code = 1 (PCM)
        assert_eq!(u16::from_le_bytes([header[20], header[21]]), 1);
        // fmt chunk size = 16
        assert_eq!(u32::from_le_bytes([header[16], header[17], header[18], header[19]]), 16);
    }

    #[test]
    fn header_44100hz_mono_16bit() {
        let header = wav_header(44100, 16, 1, 12288);

        let channels = u16::from_le_bytes([header[22], header[23]]);
        assert_eq!(channels, 1);

        let sample_rate = u32::from_le_bytes([header[24], header[25], header[26], header[27]]);
        assert_eq!(sample_rate, 44100);

        let byte_rate = u32::from_le_bytes([header[28], header[29], header[30], header[31]]);
        assert_eq!(byte_rate, 88200); // 44100 * 1 * 16/8

        let block_align = u16::from_le_bytes([header[32], header[33]]);
        assert_eq!(block_align, 2); // 1 * 16/8

        let bits = u16::from_le_bytes([header[34], header[35]]);
        assert_eq!(bits, 16);

        let data_size = u32::from_le_bytes([header[40], header[41], header[42], header[43]]);
        assert_eq!(data_size, 12288);

        let chunk_size = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        assert_eq!(chunk_size, 36 + 12288);
    }

    #[test]
    fn oversized_payload_saturates_instead_of_wrapping() {
        assert_eq!(data_chunk_size(u32::MAX as u64), u32::MAX);
        assert_eq!(data_chunk_size(u32::MAX as u64 + 1), u32::MAX);
        assert_eq!(data_chunk_size(5 << 32), u32::MAX);

        // 36 + data must not wrap either, even when data alone fits.
        assert_eq!(riff_chunk_size(u32::MAX as u64 - 10), u32::MAX);
        assert_eq!(riff_chunk_size(1024), 36 + 1024);
    }

    #[test]
    fn provisional_header_declares_zero_payload() {
        let header = wav_header(44100, 16, 1, 0);
        let data_size = u32::from_le_bytes([header[40], header[41], header[42], header[43]]);
        assert_eq!(data_size, 0);
        let chunk_size = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        assert_eq!(chunk_size, 36);
    }
}
