//! Encoder contract for the scorecast controller.
//!
//! The real camera encoder lives outside this workspace. This crate defines
//! the narrow interface the controller drives (`Encoder`), the parameters it
//! passes on start, and the bridge (`StatusSink`) through which the encoder
//! reports status signals back from its own threads.

mod error;
mod logging;
mod sink;

pub use error::EncoderError;
pub use logging::LoggingEncoder;
pub use sink::StatusSink;

use scorecast_ipc::{BitrateQuality, ResolvedTarget, VideoQuality};

/// Result type for encoder operations.
pub type EncoderResult<T> = Result<T, EncoderError>;

/// Status codes emitted by the encoder.
pub mod codes {
    /// Handshake with the server succeeded.
    pub const CONNECT_SUCCESS: &str = "NetStream.Connect.Success";

    /// The server accepted the publish.
    pub const PUBLISH_START: &str = "NetStream.Publish.Start";

    /// The connection could not be established.
    pub const CONNECT_FAILED: &str = "NetStream.Connect.Failed";

    /// The server refused the stream (usually a bad key).
    pub const CONNECT_REJECTED: &str = "NetStream.Connect.Rejected";

    /// The server closed the connection.
    pub const CONNECT_CLOSED: &str = "NetStream.Connect.Closed";

    /// Publishing stopped.
    pub const PLAY_STOP: &str = "NetStream.Play.Stop";
}

/// Video parameters passed to the encoder on start.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoParams {
    /// Width in pixels.
    pub width: u32,

    /// Height in pixels.
    pub height: u32,

    /// Target frames per second.
    pub fps: u32,

    /// Target bitrate in bits per second.
    pub bitrate_bps: u32,

    /// Keyframe interval in frames.
    pub gop: u32,

    /// Encoder profile index (1 = baseline).
    pub profile: u8,
}

impl VideoParams {
    /// Derive encoder parameters from the operator's stream settings.
    ///
    /// The GOP is two seconds of frames; the `High` preset raises the base
    /// bitrate by half.
    pub fn from_settings(quality: VideoQuality, fps: u32, bitrate: BitrateQuality) -> Self {
        let (width, height) = quality.dimensions();
        let bitrate_bps = (f64::from(quality.bitrate_bps()) * bitrate.multiplier()).round() as u32;

        Self {
            width,
            height,
            fps,
            bitrate_bps,
            gop: fps * 2,
            profile: 1,
        }
    }
}

impl Default for VideoParams {
    fn default() -> Self {
        Self::from_settings(VideoQuality::default(), 30, BitrateQuality::default())
    }
}

/// Audio parameters passed to the encoder on start.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioParams {
    /// Target bitrate in bits per second.
    pub bitrate_bps: u32,

    /// AAC profile index.
    pub profile: u8,

    /// Sample rate in Hz.
    pub sample_rate: u32,

    /// Whether the microphone is muted.
    pub muted: bool,
}

impl AudioParams {
    /// Default audio settings with the given mute state.
    pub fn with_muted(muted: bool) -> Self {
        Self {
            muted,
            ..Self::default()
        }
    }
}

impl Default for AudioParams {
    fn default() -> Self {
        Self {
            bitrate_bps: 128_000,
            profile: 1,
            sample_rate: 44_100,
            muted: true,
        }
    }
}

/// The camera encoder driven by the controller.
///
/// `start` with `None` means local capture only. Implementations report
/// progress asynchronously through a [`StatusSink`], possibly after `stop`.
pub trait Encoder: Send {
    /// Begin publishing (and/or recording).
    fn start(
        &mut self,
        target: Option<&ResolvedTarget>,
        video: &VideoParams,
        audio: &AudioParams,
    ) -> EncoderResult<()>;

    /// Stop publishing.
    fn stop(&mut self) -> EncoderResult<()>;

    /// Get encoder name for diagnostics.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_params_standard() {
        let params = VideoParams::from_settings(VideoQuality::Hd720, 30, BitrateQuality::Standard);
        assert_eq!((params.width, params.height), (1280, 720));
        assert_eq!(params.bitrate_bps, 2_500_000);
        assert_eq!(params.gop, 60);
    }

    #[test]
    fn test_video_params_high_bitrate() {
        let params =
            VideoParams::from_settings(VideoQuality::FullHd1080, 60, BitrateQuality::High);
        assert_eq!(params.bitrate_bps, 6_750_000);
        assert_eq!(params.gop, 120);
    }

    #[test]
    fn test_audio_params_defaults() {
        let audio = AudioParams::with_muted(false);
        assert_eq!(audio.bitrate_bps, 128_000);
        assert_eq!(audio.sample_rate, 44_100);
        assert!(!audio.muted);
    }
}
