//! Encoder stand-in for hosts without a camera backend.

use tracing::{info, instrument};

use scorecast_ipc::ResolvedTarget;

use crate::{codes, AudioParams, Encoder, EncoderError, EncoderResult, StatusSink, VideoParams};

/// An encoder that only logs what it is asked to do.
///
/// When given a sink it acknowledges the lifecycle the way a real publisher
/// would: `Publish.Start` after a network start, `Connect.Closed` after stop.
#[derive(Debug, Default)]
pub struct LoggingEncoder {
    sink: Option<StatusSink>,
    running: bool,
    publishing: bool,
}

impl LoggingEncoder {
    /// Create a silent encoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an encoder that acknowledges through the given sink.
    pub fn with_sink(sink: StatusSink) -> Self {
        Self {
            sink: Some(sink),
            ..Self::default()
        }
    }

    /// Whether a session is running.
    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl Encoder for LoggingEncoder {
    #[instrument(name = "logging_encoder_start", skip_all)]
    fn start(
        &mut self,
        target: Option<&ResolvedTarget>,
        video: &VideoParams,
        audio: &AudioParams,
    ) -> EncoderResult<()> {
        if self.running {
            return Err(EncoderError::AlreadyStarted);
        }

        info!(
            network = target.is_some(),
            width = video.width,
            height = video.height,
            fps = video.fps,
            video_bitrate = video.bitrate_bps,
            audio_muted = audio.muted,
            "Encoder started"
        );

        self.running = true;
        self.publishing = target.is_some();

        if self.publishing {
            if let Some(ref sink) = self.sink {
                sink.emit(codes::PUBLISH_START, "");
            }
        }

        Ok(())
    }

    #[instrument(name = "logging_encoder_stop", skip_all)]
    fn stop(&mut self) -> EncoderResult<()> {
        if !self.running {
            return Ok(());
        }

        info!("Encoder stopped");
        self.running = false;

        if std::mem::take(&mut self.publishing) {
            if let Some(ref sink) = self.sink {
                sink.emit(codes::CONNECT_CLOSED, "");
            }
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "logging"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scorecast_ipc::ControllerCommand;

    fn target() -> ResolvedTarget {
        ResolvedTarget {
            url: "rtmps://ingest.twitch.tv/app/abc".to_string(),
            key: "abc".to_string(),
        }
    }

    #[test]
    fn test_start_twice_fails() {
        let mut encoder = LoggingEncoder::new();
        let video = VideoParams::default();
        let audio = AudioParams::default();

        encoder.start(None, &video, &audio).unwrap();
        assert!(encoder.is_running());
        assert!(matches!(
            encoder.start(None, &video, &audio),
            Err(EncoderError::AlreadyStarted)
        ));
    }

    #[test]
    fn test_acknowledges_network_session() {
        let (tx, rx) = crossbeam_channel::bounded(4);
        let mut encoder = LoggingEncoder::with_sink(StatusSink::new(tx));
        let target = target();

        encoder
            .start(Some(&target), &VideoParams::default(), &AudioParams::default())
            .unwrap();
        encoder.stop().unwrap();
        encoder.stop().unwrap();

        let seen: Vec<String> = rx
            .try_iter()
            .filter_map(|command| match command {
                ControllerCommand::EncoderStatus { code, .. } => Some(code),
                _ => None,
            })
            .collect();
        assert_eq!(seen, vec![codes::PUBLISH_START, codes::CONNECT_CLOSED]);
    }

    #[test]
    fn test_local_session_is_silent() {
        let (tx, rx) = crossbeam_channel::bounded(4);
        let mut encoder = LoggingEncoder::with_sink(StatusSink::new(tx));

        encoder
            .start(None, &VideoParams::default(), &AudioParams::default())
            .unwrap();
        encoder.stop().unwrap();

        assert!(rx.try_recv().is_err());
    }
}
