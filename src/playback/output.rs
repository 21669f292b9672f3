//! `rodio`-backed audio output.
//!
//! The output stream is opened lazily on first use and kept for the life of
//! the player thread. Seeking rebuilds the sink and skips into the file, so
//! the reported position is `base_position + sink.get_pos()`.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use super::file_sink::resolve_media_path;
use super::probe::SinkError;
use super::real::{AudioOutput, PlayError};

/// Create a paused `Sink` for `path` that starts playback at `start_at`.
/// Also returns the decoder's total duration when known.
fn create_sink_at(
    stream: &OutputStream,
    path: &Path,
    uri: &str,
    start_at: Duration,
) -> Result<(Sink, Option<Duration>), SinkError> {
    let file = File::open(path).map_err(|source| SinkError::Io {
        uri: uri.to_string(),
        source,
    })?;

    let decoder = Decoder::new(BufReader::new(file)).map_err(|e| SinkError::Decode {
        uri: uri.to_string(),
        reason: e.to_string(),
    })?;
    let total = decoder.total_duration();

    let sink = Sink::connect_new(stream.mixer());
    // `skip_duration` is the seeking primitive; even Duration::ZERO is fine.
    sink.append(decoder.skip_duration(start_at));
    sink.pause();
    Ok((sink, total))
}

pub struct RodioOutput {
    media_root: PathBuf,
    stream: Option<OutputStream>,
    sink: Option<Sink>,
    current: Option<(PathBuf, String)>,
    base_position: Duration,
}

impl RodioOutput {
    pub fn new(media_root: impl Into<PathBuf>) -> Self {
        Self {
            media_root: media_root.into(),
            stream: None,
            sink: None,
            current: None,
            base_position: Duration::ZERO,
        }
    }

    fn stream(&mut self) -> Result<&OutputStream, SinkError> {
        if self.stream.is_none() {
            let mut stream = OutputStreamBuilder::open_default_stream()
                .map_err(|e| SinkError::NoOutput(e.to_string()))?;
            // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
            // but noisy for a TUI app.
            stream.log_on_drop(false);
            self.stream = Some(stream);
        }
        self.stream
            .as_ref()
            .ok_or_else(|| SinkError::NoOutput("output stream unavailable".to_string()))
    }
}

impl AudioOutput for RodioOutput {
    fn open(&mut self, uri: &str) -> Result<Option<Duration>, SinkError> {
        self.stop();
        let path = resolve_media_path(&self.media_root, uri)?;
        let (sink, total) = create_sink_at(self.stream()?, &path, uri, Duration::ZERO)?;
        self.sink = Some(sink);
        self.current = Some((path, uri.to_string()));
        self.base_position = Duration::ZERO;
        Ok(total)
    }

    fn play(&mut self) -> Result<(), PlayError> {
        let sink = self.sink.as_ref().ok_or(PlayError::NoSource)?;
        sink.play();
        if sink.is_paused() {
            return Err(PlayError::Blocked("output refused to start".to_string()));
        }
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(s) = self.sink.as_ref() {
            s.pause();
        }
    }

    fn seek(&mut self, to: Duration) -> Result<(), SinkError> {
        let Some((path, uri)) = self.current.clone() else {
            return Ok(());
        };
        let resume = self.sink.as_ref().map(|s| !s.is_paused()).unwrap_or(false);
        if let Some(s) = self.sink.take() {
            s.stop();
        }

        let (sink, _) = create_sink_at(self.stream()?, &path, &uri, to)?;
        if resume {
            sink.play();
        }
        self.sink = Some(sink);
        self.base_position = to;
        Ok(())
    }

    fn position(&self) -> Duration {
        self.base_position + self.sink.as_ref().map(Sink::get_pos).unwrap_or_default()
    }

    fn is_finished(&self) -> bool {
        self.sink
            .as_ref()
            .map(|s| !s.is_paused() && s.empty())
            .unwrap_or(false)
    }

    fn stop(&mut self) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        self.current = None;
        self.base_position = Duration::ZERO;
    }
}
