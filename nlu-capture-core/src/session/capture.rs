use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::models::config::CaptureConfig;
use crate::models::error::CaptureError;
use crate::models::recording_result::{RecordingMetadata, RecordingResult};
use crate::models::state::CaptureState;
use crate::storage::wav_writer::{self, WavFileWriter};
use crate::traits::audio_source::AudioSource;
use crate::traits::capture_delegate::CaptureDelegate;

/// Backoff when a drain cycle finds no samples available.
const IDLE_READ_BACKOFF: Duration = Duration::from_millis(5);

/// Mutable session state shared with the drain thread.
///
/// The single mutex is the mutual-exclusion point for {start, stop, drain}:
/// only one of them touches the source, the writer, or the byte counter at a
/// time, which also guarantees payload bytes land in capture order.
struct SessionInner {
    state: CaptureState,
    source: Box<dyn AudioSource>,
    writer: Option<WavFileWriter>,
    total_bytes_written: u64,
}

enum DrainOutcome {
    /// Bytes appended this cycle (0 = nothing available).
    Drained(usize),
    /// The session tore itself down after an i/o failure.
    Terminated,
}

/// Coordinates hardware acquisition, the periodic drain loop, and teardown.
///
/// Lifecycle: `idle → (start) → recording → (stop | i/o failure) → stopped`.
/// A session records once; construct a new one for each recording.
///
/// `start()` and `stop()` perform blocking file and device i/o — do not call
/// them from a latency-sensitive or UI-facing thread. No duration ceiling is
/// enforced here; the NLU service's ~10 second input limit is a usage
/// constraint on the caller.
pub struct CaptureSession {
    config: CaptureConfig,
    file_path: PathBuf,
    /// Drain buffer size in bytes, after negotiation with the hardware.
    buffer_size: usize,
    /// Drain period in sample frames, after negotiation.
    frame_period: usize,
    inner: Arc<Mutex<SessionInner>>,
    running: Arc<AtomicBool>,
    drain_handle: Option<thread::JoinHandle<()>>,
    delegate: Option<Arc<dyn CaptureDelegate>>,
}

impl CaptureSession {
    /// Create a session that will record to `file_path`.
    ///
    /// Performs buffer-size negotiation: the nominal buffer covers one
    /// 120 ms frame period, but if the hardware requires a larger internal
    /// buffer the session adopts the hardware minimum and recomputes the
    /// frame period from it. Some driver combinations refuse smaller buffers
    /// and would fail to initialize otherwise.
    pub fn new(
        source: Box<dyn AudioSource>,
        config: CaptureConfig,
        file_path: PathBuf,
    ) -> Result<Self, CaptureError> {
        config.validate().map_err(CaptureError::Initialization)?;

        let block_align = config.block_align();
        let mut frame_period = config.nominal_frame_period();
        let mut buffer_size = frame_period * block_align;

        let hardware_min =
            source.minimum_buffer_size(config.sample_rate, config.channels, config.bits_per_sample);
        if buffer_size < hardware_min {
            buffer_size = hardware_min;
            frame_period = buffer_size / block_align;
            log::warn!("increasing capture buffer to {} bytes", buffer_size);
        }

        Ok(Self {
            config,
            file_path,
            buffer_size,
            frame_period,
            inner: Arc::new(Mutex::new(SessionInner {
                state: CaptureState::Idle,
                source,
                writer: None,
                total_bytes_written: 0,
            })),
            running: Arc::new(AtomicBool::new(false)),
            drain_handle: None,
            delegate: None,
        })
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn CaptureDelegate>) {
        self.delegate = Some(delegate);
    }

    /// Acquire the hardware source, open the output file, and begin the
    /// drain loop. Transitions: idle → recording.
    ///
    /// Fails with `InvalidState` if the session is not idle. On any failure
    /// the source is released again — construction failures must not leak
    /// the device.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        {
            let mut inner = self.inner.lock();
            if !inner.state.is_idle() {
                return Err(CaptureError::InvalidState("session already started"));
            }

            inner.source.acquire()?;

            let writer = match WavFileWriter::open(self.file_path.clone(), &self.config) {
                Ok(writer) => writer,
                Err(e) => {
                    inner.source.release();
                    return Err(e);
                }
            };
            inner.writer = Some(writer);
            inner.state = CaptureState::Recording;
        }
        self.notify_state(CaptureState::Recording);

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let inner = Arc::clone(&self.inner);
        let delegate = self.delegate.clone();
        let buffer_size = self.buffer_size;

        let spawned = thread::Builder::new().name("audio-drain".into()).spawn(move || {
            // Fixed frame buffer reused across drain cycles.
            let mut frame = vec![0u8; buffer_size];
            loop {
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                let drained = {
                    let mut inner = inner.lock();
                    if !inner.state.is_recording() {
                        break;
                    }
                    match Self::drain_once(&mut inner, &mut frame, delegate.as_deref()) {
                        DrainOutcome::Drained(n) => n,
                        DrainOutcome::Terminated => break,
                    }
                };
                if drained == 0 {
                    thread::sleep(IDLE_READ_BACKOFF);
                }
            }
        });

        match spawned {
            Ok(handle) => {
                self.drain_handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                let mut inner = self.inner.lock();
                inner.source.release();
                inner.writer = None;
                inner.state = CaptureState::Stopped;
                Err(CaptureError::Initialization(format!(
                    "failed to spawn drain thread: {}",
                    e
                )))
            }
        }
    }

    /// One drain cycle: read up to one buffer of samples and append them.
    ///
    /// Read or write failure terminates the session unilaterally — the
    /// error cannot reach a caller synchronously, so it is logged, reported
    /// through the delegate, and the hardware is released so a future
    /// session can still acquire it. The writer is dropped unfinalized,
    /// leaving a header that declares a zero-size payload.
    fn drain_once(
        inner: &mut SessionInner,
        frame: &mut [u8],
        delegate: Option<&dyn CaptureDelegate>,
    ) -> DrainOutcome {
        let read = match inner.source.read(frame) {
            Ok(n) => n,
            Err(e) => {
                Self::abort(inner, &e, delegate);
                return DrainOutcome::Terminated;
            }
        };
        if read == 0 {
            return DrainOutcome::Drained(0);
        }

        let Some(writer) = inner.writer.as_mut() else {
            return DrainOutcome::Terminated;
        };
        if let Err(e) = writer.append(&frame[..read]) {
            Self::abort(inner, &e, delegate);
            return DrainOutcome::Terminated;
        }
        inner.total_bytes_written += read as u64;
        DrainOutcome::Drained(read)
    }

    fn abort(inner: &mut SessionInner, error: &CaptureError, delegate: Option<&dyn CaptureDelegate>) {
        log::warn!("error while draining audio input, aborting capture: {}", error);
        inner.source.release();
        inner.writer = None;
        inner.state = CaptureState::Stopped;
        if let Some(delegate) = delegate {
            delegate.on_state_changed(CaptureState::Stopped);
            delegate.on_error(error);
        }
    }

    /// Release the hardware, finalize the WAV file, and return the result.
    /// Transitions: recording → stopped.
    ///
    /// Fails with `InvalidState` if the session is not recording — including
    /// when a drain-cycle failure already terminated it, which reads as
    /// "stop after already stopped" rather than pretending the recording is
    /// still active.
    pub fn stop(&mut self) -> Result<RecordingResult, CaptureError> {
        {
            let mut inner = self.inner.lock();
            if !inner.state.is_recording() {
                return Err(CaptureError::InvalidState("not recording"));
            }
            inner.source.release();
            inner.state = CaptureState::Stopped;
        }
        self.notify_state(CaptureState::Stopped);

        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.drain_handle.take() {
            let _ = handle.join();
        }

        let writer = self
            .inner
            .lock()
            .writer
            .take()
            .ok_or(CaptureError::InvalidState("recording already finalized"))?;
        let data_bytes = writer.finalize()?;

        let checksum = wav_writer::checksum_file(&self.file_path)?;
        let file_path_str = self.file_path.to_string_lossy().to_string();
        let meta = RecordingMetadata::new(&self.config, &file_path_str, data_bytes, &checksum);
        if self.config.write_sidecar {
            meta.write_sidecar(&self.file_path)?;
        }

        let result = RecordingResult {
            file_path: self.file_path.clone(),
            data_bytes,
            duration_secs: meta.duration_secs,
            checksum,
            metadata: meta,
        };

        if let Some(ref delegate) = self.delegate {
            delegate.on_capture_finished(&result);
        }
        Ok(result)
    }

    pub fn state(&self) -> CaptureState {
        self.inner.lock().state
    }

    pub fn is_recording(&self) -> bool {
        self.inner.lock().state.is_recording()
    }

    /// Payload bytes drained so far.
    pub fn total_bytes_written(&self) -> u64 {
        self.inner.lock().total_bytes_written
    }

    /// Negotiated drain buffer size in bytes.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Negotiated drain period in sample frames.
    pub fn frame_period(&self) -> usize {
        self.frame_period
    }

    /// Negotiated drain period in milliseconds.
    pub fn frame_period_ms(&self) -> f64 {
        self.frame_period as f64 * 1000.0 / self.config.sample_rate as f64
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    fn notify_state(&self, state: CaptureState) {
        if let Some(ref delegate) = self.delegate {
            delegate.on_state_changed(state);
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        {
            let mut inner = self.inner.lock();
            if inner.state.is_recording() {
                inner.source.release();
                inner.writer = None;
                inner.state = CaptureState::Stopped;
            }
        }
        if let Some(handle) = self.drain_handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::fs;
    use std::sync::atomic::AtomicUsize;
    use std::time::Instant;

    use approx::assert_relative_eq;

    #[derive(Default)]
    struct FakeFlags {
        acquired: AtomicBool,
        release_count: AtomicUsize,
    }

    /// Scripted stand-in for the platform microphone. Each `read` pops the
    /// next scripted result; an exhausted script reads as "no samples yet".
    struct FakeSource {
        min_buffer: usize,
        script: VecDeque<Result<Vec<u8>, CaptureError>>,
        flags: Arc<FakeFlags>,
    }

    impl FakeSource {
        fn new(min_buffer: usize) -> (Self, Arc<FakeFlags>) {
            let flags = Arc::new(FakeFlags::default());
            (
                Self {
                    min_buffer,
                    script: VecDeque::new(),
                    flags: Arc::clone(&flags),
                },
                flags,
            )
        }

        fn with_chunks(min_buffer: usize, chunks: Vec<Result<Vec<u8>, CaptureError>>) -> (Self, Arc<FakeFlags>) {
            let (mut source, flags) = Self::new(min_buffer);
            source.script = chunks.into();
            (source, flags)
        }
    }

    impl AudioSource for FakeSource {
        fn minimum_buffer_size(&self, _sample_rate: u32, _channels: u16, _bits_per_sample: u16) -> usize {
            self.min_buffer
        }

        fn acquire(&mut self) -> Result<(), CaptureError> {
            if self.flags.acquired.swap(true, Ordering::SeqCst) {
                return Err(CaptureError::Initialization("device busy".into()));
            }
            Ok(())
        }

        fn read(&mut self, buf: &mut [u8]) -> Result<usize, CaptureError> {
            match self.script.pop_front() {
                Some(Ok(chunk)) => {
                    let n = chunk.len().min(buf.len());
                    buf[..n].copy_from_slice(&chunk[..n]);
                    Ok(n)
                }
                Some(Err(e)) => Err(e),
                None => Ok(0),
            }
        }

        fn release(&mut self) {
            self.flags.acquired.store(false, Ordering::SeqCst);
            self.flags.release_count.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn temp_wav(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("nlu_session_test_{}.wav", name))
    }

    fn wait_for(timeout: Duration, condition: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        condition()
    }

    fn read_u32_le(data: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]])
    }

    #[test]
    fn nominal_buffer_used_when_above_hardware_minimum() {
        let (source, _) = FakeSource::new(1024);
        let session =
            CaptureSession::new(Box::new(source), CaptureConfig::default(), temp_wav("nominal")).unwrap();

        // 120 ms at 44100 Hz, mono, 16-bit
        assert_eq!(session.buffer_size(), 10584);
        assert_eq!(session.frame_period(), 5292);
    }

    #[test]
    fn buffer_negotiation_adopts_hardware_minimum() {
        let (source, _) = FakeSource::new(16384);
        let session =
            CaptureSession::new(Box::new(source), CaptureConfig::default(), temp_wav("fallback")).unwrap();

        assert_eq!(session.buffer_size(), 16384);
        assert_eq!(session.frame_period(), 8192);
        assert_relative_eq!(session.frame_period_ms(), 185.76, epsilon = 0.01);
    }

    #[test]
    fn records_three_drain_cycles_to_exact_file_size() {
        let path = temp_wav("three_cycles");
        let chunks = vec![Ok(vec![0x7fu8; 4096]), Ok(vec![0x01u8; 4096]), Ok(vec![0x80u8; 4096])];
        let (source, flags) = FakeSource::with_chunks(1024, chunks);

        let mut session =
            CaptureSession::new(Box::new(source), CaptureConfig::default(), path.clone()).unwrap();
        session.start().unwrap();
        assert!(session.is_recording());

        assert!(wait_for(Duration::from_secs(2), || session.total_bytes_written() >= 12288));

        let result = session.stop().unwrap();
        assert_eq!(result.data_bytes, 12288);
        assert_eq!(result.file_path, path);

        let file_data = fs::read(&path).unwrap();
        assert_eq!(file_data.len(), 44 + 12288);
        assert_eq!(read_u32_le(&file_data, 4), 36 + 12288);
        assert_eq!(read_u32_le(&file_data, 40), 12288);
        assert!(!flags.acquired.load(Ordering::SeqCst));

        fs::remove_file(&path).ok();
    }

    #[test]
    fn immediate_stop_yields_header_only_wav() {
        let path = temp_wav("immediate_stop");
        let (source, flags) = FakeSource::new(1024);

        let mut session =
            CaptureSession::new(Box::new(source), CaptureConfig::default(), path.clone()).unwrap();
        session.start().unwrap();
        let result = session.stop().unwrap();

        assert_eq!(result.data_bytes, 0);
        let file_data = fs::read(&path).unwrap();
        assert_eq!(file_data.len(), 44);
        assert_eq!(read_u32_le(&file_data, 40), 0);
        assert!(!flags.acquired.load(Ordering::SeqCst));

        fs::remove_file(&path).ok();
    }

    #[test]
    fn stop_without_start_is_invalid_and_touches_nothing() {
        let path = temp_wav("stop_without_start");
        fs::remove_file(&path).ok();
        let (source, flags) = FakeSource::new(1024);

        let mut session =
            CaptureSession::new(Box::new(source), CaptureConfig::default(), path.clone()).unwrap();
        let err = session.stop().unwrap_err();
        assert!(matches!(err, CaptureError::InvalidState(_)));

        assert!(!path.exists());
        assert_eq!(flags.release_count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn start_twice_is_invalid() {
        let path = temp_wav("start_twice");
        let (source, _) = FakeSource::new(1024);

        let mut session =
            CaptureSession::new(Box::new(source), CaptureConfig::default(), path.clone()).unwrap();
        session.start().unwrap();
        let err = session.start().unwrap_err();
        assert!(matches!(err, CaptureError::InvalidState(_)));

        session.stop().unwrap();
        fs::remove_file(&path).ok();
    }

    #[test]
    fn io_failure_mid_drain_tears_down_without_finalize() {
        let path = temp_wav("io_failure");
        let chunks = vec![Ok(vec![0x55u8; 4096]), Err(CaptureError::Io("simulated read failure".into()))];
        let (source, flags) = FakeSource::with_chunks(1024, chunks);

        let mut session =
            CaptureSession::new(Box::new(source), CaptureConfig::default(), path.clone()).unwrap();
        session.start().unwrap();

        assert!(wait_for(Duration::from_secs(2), || !session.is_recording()));
        assert_eq!(session.state(), CaptureState::Stopped);
        assert!(!flags.acquired.load(Ordering::SeqCst));

        // A later stop reads as stop-after-stopped; it must not finalize.
        let err = session.stop().unwrap_err();
        assert!(matches!(err, CaptureError::InvalidState(_)));

        // The file was never finalized: sizes still declare zero payload.
        let file_data = fs::read(&path).unwrap();
        assert_eq!(file_data.len(), 44 + 4096);
        assert_eq!(read_u32_le(&file_data, 4), 36);
        assert_eq!(read_u32_le(&file_data, 40), 0);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn drop_while_recording_releases_hardware() {
        let path = temp_wav("drop_release");
        let (source, flags) = FakeSource::new(1024);

        let mut session =
            CaptureSession::new(Box::new(source), CaptureConfig::default(), path.clone()).unwrap();
        session.start().unwrap();
        drop(session);

        assert!(!flags.acquired.load(Ordering::SeqCst));
        fs::remove_file(&path).ok();
    }

    #[test]
    fn second_source_cannot_acquire_while_recording() {
        let path = temp_wav("exclusive");
        let (source, flags) = FakeSource::new(1024);

        let mut session =
            CaptureSession::new(Box::new(source), CaptureConfig::default(), path.clone()).unwrap();
        session.start().unwrap();

        // The device is a shared, exclusively-lockable resource.
        assert!(flags.acquired.load(Ordering::SeqCst));

        session.stop().unwrap();
        assert!(!flags.acquired.load(Ordering::SeqCst));
        fs::remove_file(&path).ok();
    }

    #[test]
    fn sidecar_written_when_configured() {
        let path = temp_wav("sidecar");
        let (source, _) = FakeSource::new(1024);
        let config = CaptureConfig {
            write_sidecar: true,
            ..Default::default()
        };

        let mut session = CaptureSession::new(Box::new(source), config, path.clone()).unwrap();
        session.start().unwrap();
        let result = session.stop().unwrap();

        let loaded = RecordingMetadata::load_sidecar(&path).unwrap();
        assert_eq!(loaded, result.metadata);

        fs::remove_file(&path).ok();
        fs::remove_file(crate::storage::metadata::sidecar_path(&path)).ok();
    }

    struct RecordingDelegate {
        states: Mutex<Vec<CaptureState>>,
        errors: Mutex<Vec<CaptureError>>,
        finished: AtomicBool,
    }

    impl CaptureDelegate for RecordingDelegate {
        fn on_state_changed(&self, state: CaptureState) {
            self.states.lock().push(state);
        }

        fn on_error(&self, error: &CaptureError) {
            self.errors.lock().push(error.clone());
        }

        fn on_capture_finished(&self, _result: &RecordingResult) {
            self.finished.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn delegate_observes_lifecycle() {
        let path = temp_wav("delegate");
        let (source, _) = FakeSource::new(1024);
        let delegate = Arc::new(RecordingDelegate {
            states: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
            finished: AtomicBool::new(false),
        });

        let mut session =
            CaptureSession::new(Box::new(source), CaptureConfig::default(), path.clone()).unwrap();
        session.set_delegate(Arc::clone(&delegate) as Arc<dyn CaptureDelegate>);
        session.start().unwrap();
        session.stop().unwrap();

        let states = delegate.states.lock().clone();
        assert_eq!(states, vec![CaptureState::Recording, CaptureState::Stopped]);
        assert!(delegate.finished.load(Ordering::SeqCst));
        assert!(delegate.errors.lock().is_empty());

        fs::remove_file(&path).ok();
    }

    #[test]
    fn delegate_notified_of_drain_failure() {
        let path = temp_wav("delegate_failure");
        let chunks = vec![Err(CaptureError::Io("simulated read failure".into()))];
        let (source, _) = FakeSource::with_chunks(1024, chunks);
        let delegate = Arc::new(RecordingDelegate {
            states: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
            finished: AtomicBool::new(false),
        });

        let mut session =
            CaptureSession::new(Box::new(source), CaptureConfig::default(), path.clone()).unwrap();
        session.set_delegate(Arc::clone(&delegate) as Arc<dyn CaptureDelegate>);
        session.start().unwrap();

        assert!(wait_for(Duration::from_secs(2), || !delegate.errors.lock().is_empty()));
        assert!(!delegate.finished.load(Ordering::SeqCst));

        fs::remove_file(&path).ok();
    }
}
