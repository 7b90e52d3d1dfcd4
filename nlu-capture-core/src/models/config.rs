/// Configuration for a capture session.
///
/// The defaults are the format the NLU service expects and the only one this
/// pipeline supports: 44100 Hz, mono, 16-bit linear PCM.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Capture sample rate in Hz (default: 44100).
    pub sample_rate: u32,

    /// Number of channels. Only mono (1) is supported.
    pub channels: u16,

    /// Bits per sample. Only 16-bit PCM is supported.
    pub bits_per_sample: u16,

    /// Nominal drain period in milliseconds (default: 120). The negotiated
    /// period may be longer if the hardware imposes a larger minimum buffer.
    pub frame_period_ms: u32,

    /// Write a `.metadata.json` sidecar when the recording completes.
    pub write_sidecar: bool,
}

impl CaptureConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if self.channels != 1 {
            return Err(format!("unsupported channel count: {}", self.channels));
        }
        if self.bits_per_sample != 16 {
            return Err(format!("unsupported bit depth: {}", self.bits_per_sample));
        }
        if self.frame_period_ms == 0 {
            return Err("frame period must be positive".into());
        }
        Ok(())
    }

    /// Bytes per interleaved sample frame (`channels * bits / 8`).
    pub fn block_align(&self) -> usize {
        self.channels as usize * self.bits_per_sample as usize / 8
    }

    /// Payload bytes per second of audio.
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.channels as u32 * self.bits_per_sample as u32 / 8
    }

    /// Nominal drain period expressed in sample frames.
    pub fn nominal_frame_period(&self) -> usize {
        self.sample_rate as usize * self.frame_period_ms as usize / 1000
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            channels: 1,
            bits_per_sample: 16,
            frame_period_ms: 120,
            write_sidecar: false,
        }
    }
}
