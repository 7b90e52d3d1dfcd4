use crate::models::error::CaptureError;

/// Interface for platform microphone input.
///
/// The hardware is a system-wide, exclusively-lockable device. A session
/// acquires it for the duration of a recording and must release it on every
/// exit path — normal stop, i/o failure, and construction failure — so a
/// later session can acquire it again.
///
/// Sessions take the source as an explicit handle rather than a process-wide
/// singleton, so tests can supply a scripted fake with the same capability
/// set.
pub trait AudioSource: Send {
    /// Minimum internal buffer the hardware accepts for the given format,
    /// in bytes. Some driver combinations refuse smaller buffers and would
    /// fail to initialize; the session sizes its drain buffer up to this.
    fn minimum_buffer_size(&self, sample_rate: u32, channels: u16, bits_per_sample: u16) -> usize;

    /// Acquire the device exclusively.
    ///
    /// Fails with `CaptureError::Initialization` if the device is held by
    /// another session or unavailable.
    fn acquire(&mut self) -> Result<(), CaptureError>;

    /// Read captured PCM bytes into `buf`, blocking for at most roughly one
    /// frame period. `Ok(0)` means no samples were available this cycle.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, CaptureError>;

    /// Release the device. Idempotent.
    fn release(&mut self);
}
