pub mod audio_source;
pub mod capture_delegate;
