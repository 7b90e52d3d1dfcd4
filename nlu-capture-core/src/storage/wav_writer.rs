use std::fs::{self, File};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::models::config::CaptureConfig;
use crate::models::error::CaptureError;
use crate::processing::wav_format;

/// Streaming WAV file writer.
///
/// Writes a provisional 44-byte header with zeroed size fields, appends PCM
/// bytes verbatim as they are drained from the hardware, and patches the two
/// chunk-size fields once the total payload length is known.
///
/// `finalize` consumes the writer, so a file can only be finalized once.
/// Dropping an unfinalized writer leaves the header declaring a zero-size
/// payload — still a structurally valid (if empty) WAV, never a header that
/// claims more data than was written.
pub struct WavFileWriter {
    file_path: PathBuf,
    file: File,
    data_bytes_written: u64,
}

impl WavFileWriter {
    /// Create/truncate the file at `file_path` and write the provisional
    /// header. Fails with `CaptureError::Io` if the path is not writable.
    pub fn open(file_path: PathBuf, config: &CaptureConfig) -> Result<Self, CaptureError> {
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| CaptureError::Io(format!("failed to create directory: {}", e)))?;
        }

        let mut file = File::create(&file_path)
            .map_err(|e| CaptureError::Io(format!("failed to create file: {}", e)))?;

        let header = wav_format::wav_header(
            config.sample_rate,
            config.bits_per_sample,
            config.channels,
            0, // data size unknown yet — patched in finalize()
        );
        file.write_all(&header)
            .map_err(|e| CaptureError::Io(format!("failed to write header: {}", e)))?;

        Ok(Self {
            file_path,
            file,
            data_bytes_written: 0,
        })
    }

    /// Append raw PCM bytes at the current write position.
    ///
    /// Append-only: no seeking happens during this phase, so payload bytes
    /// land in the exact order they were captured.
    pub fn append(&mut self, data: &[u8]) -> Result<(), CaptureError> {
        self.file
            .write_all(data)
            .map_err(|e| CaptureError::Io(format!("write failed: {}", e)))?;
        self.data_bytes_written += data.len() as u64;
        Ok(())
    }

    /// Patch the RIFF and data chunk-size fields, flush, and close the file.
    ///
    /// Consumes the writer: finalizing twice is unrepresentable. A zero
    /// payload is not an error — the result is a valid 44-byte header-only
    /// WAV; whether it holds enough audio is the remote service's concern.
    ///
    /// Returns the payload byte count.
    pub fn finalize(mut self) -> Result<u64, CaptureError> {
        let data_size = wav_format::data_chunk_size(self.data_bytes_written);

        self.file
            .seek(SeekFrom::Start(wav_format::RIFF_SIZE_OFFSET))
            .map_err(|e| CaptureError::Io(e.to_string()))?;
        self.file
            .write_all(&wav_format::riff_chunk_size(self.data_bytes_written).to_le_bytes())
            .map_err(|e| CaptureError::Io(e.to_string()))?;

        self.file
            .seek(SeekFrom::Start(wav_format::DATA_SIZE_OFFSET))
            .map_err(|e| CaptureError::Io(e.to_string()))?;
        self.file
            .write_all(&data_size.to_le_bytes())
            .map_err(|e| CaptureError::Io(e.to_string()))?;

        self.file
            .flush()
            .map_err(|e| CaptureError::Io(e.to_string()))?;

        Ok(self.data_bytes_written)
    }

    /// PCM payload bytes written so far (excludes the header).
    pub fn data_bytes_written(&self) -> u64 {
        self.data_bytes_written
    }

    /// Path of the output file.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

/// SHA-256 hex digest of a completed recording file.
pub fn checksum_file(path: &Path) -> Result<String, CaptureError> {
    let data =
        fs::read(path).map_err(|e| CaptureError::Io(format!("failed to read file for checksum: {}", e)))?;
    let digest = Sha256::digest(&data);
    Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
}
