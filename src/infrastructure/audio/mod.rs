pub mod command_sink;
pub mod sink;
pub mod wav_file_sink;

pub use command_sink::CommandSink;
pub use sink::{AudioSink, PlaybackHandle, PlaybackStatus};
pub use wav_file_sink::WavFileSink;
