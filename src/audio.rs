use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Volume used when nothing else is configured.
pub const DEFAULT_VOLUME: f32 = 0.7;

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("music file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("could not open audio output: {0}")]
    Device(String),
    #[error("could not play {}: {reason}", path.display())]
    Playback { path: PathBuf, reason: String },
}

/// Fire-and-forget playback commands.
pub trait AudioBackend {
    /// Start looping `path` indefinitely at `volume`, replacing any current track.
    fn play_loop(&mut self, path: &Path, volume: f32) -> Result<(), AudioError>;
    fn set_volume(&mut self, volume: f32);
    fn stop(&mut self);
}

/// Background music state: volume, mute and whether a track is playing.
pub struct AudioController<B: AudioBackend> {
    backend: B,
    volume: f32,
    muted: bool,
    playing: bool,
}

impl<B: AudioBackend> AudioController<B> {
    pub fn new(backend: B, volume: f32) -> Self {
        Self {
            backend,
            volume: volume.clamp(0.0, 1.0),
            muted: false,
            playing: false,
        }
    }

    /// Loop-play `path`. A missing file or backend failure leaves the
    /// controller silent; the caller decides how loudly to report it.
    pub fn play_music(&mut self, path: &Path) -> Result<(), AudioError> {
        if !path.is_file() {
            return Err(AudioError::NotFound(path.to_path_buf()));
        }
        self.backend.play_loop(path, self.effective_volume())?;
        self.playing = true;
        log::info!("Playing background music: {}", path.display());
        Ok(())
    }

    /// Flip mute. Returns the new muted state.
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.backend.set_volume(self.effective_volume());
        log::debug!("Music {}", if self.muted { "muted" } else { "unmuted" });
        self.muted
    }

    /// Store a new volume; it is only audible while unmuted.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if !self.muted {
            self.backend.set_volume(self.volume);
        }
    }

    pub fn stop(&mut self) {
        if self.playing {
            self.backend.stop();
            self.playing = false;
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    #[cfg(test)]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }
}

/// rodio output. The device is opened on first playback.
#[derive(Default)]
pub struct RodioBackend {
    // Dropping the stream silences the sink, so it lives alongside it.
    output: Option<(rodio::OutputStream, rodio::OutputStreamHandle)>,
    sink: Option<rodio::Sink>,
}

impl AudioBackend for RodioBackend {
    fn play_loop(&mut self, path: &Path, volume: f32) -> Result<(), AudioError> {
        if self.output.is_none() {
            let output =
                rodio::OutputStream::try_default().map_err(|e| AudioError::Device(e.to_string()))?;
            self.output = Some(output);
        }
        let Some((_, handle)) = &self.output else {
            return Err(AudioError::Device("output stream unavailable".into()));
        };

        let playback_err = |reason: String| AudioError::Playback {
            path: path.to_path_buf(),
            reason,
        };
        let file = File::open(path).map_err(|e| playback_err(e.to_string()))?;
        let source =
            rodio::Decoder::new_looped(BufReader::new(file)).map_err(|e| playback_err(e.to_string()))?;
        let sink = rodio::Sink::try_new(handle).map_err(|e| AudioError::Device(e.to_string()))?;

        sink.set_volume(volume);
        sink.append(source);
        if let Some(old) = self.sink.replace(sink) {
            old.stop();
        }
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        if let Some(sink) = &self.sink {
            sink.set_volume(volume);
        }
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Play(f32),
        Volume(f32),
        Stop,
    }

    #[derive(Default)]
    struct MockBackend {
        calls: Vec<Call>,
        fail: bool,
    }

    impl AudioBackend for MockBackend {
        fn play_loop(&mut self, path: &Path, volume: f32) -> Result<(), AudioError> {
            if self.fail {
                return Err(AudioError::Playback {
                    path: path.to_path_buf(),
                    reason: "boom".into(),
                });
            }
            self.calls.push(Call::Play(volume));
            Ok(())
        }

        fn set_volume(&mut self, volume: f32) {
            self.calls.push(Call::Volume(volume));
        }

        fn stop(&mut self) {
            self.calls.push(Call::Stop);
        }
    }

    fn music_file() -> tempfile::NamedTempFile {
        tempfile::NamedTempFile::new().unwrap()
    }

    #[test]
    fn plays_existing_file_at_configured_volume() {
        let file = music_file();
        let mut audio = AudioController::new(MockBackend::default(), DEFAULT_VOLUME);

        audio.play_music(file.path()).unwrap();
        assert!(audio.is_playing());
        assert_eq!(audio.backend.calls, vec![Call::Play(0.7)]);
    }

    #[test]
    fn missing_file_is_reported_and_nothing_plays() {
        let dir = tempfile::tempdir().unwrap();
        let mut audio = AudioController::new(MockBackend::default(), DEFAULT_VOLUME);

        let err = audio.play_music(&dir.path().join("music.mp3")).unwrap_err();
        assert!(matches!(err, AudioError::NotFound(_)));
        assert!(!audio.is_playing());
        assert!(audio.backend.calls.is_empty());
    }

    #[test]
    fn backend_failure_leaves_controller_silent() {
        let file = music_file();
        let backend = MockBackend {
            fail: true,
            ..MockBackend::default()
        };
        let mut audio = AudioController::new(backend, DEFAULT_VOLUME);

        assert!(audio.play_music(file.path()).is_err());
        assert!(!audio.is_playing());
        audio.stop();
        assert!(audio.backend.calls.is_empty());
    }

    #[test]
    fn mute_zeroes_and_restores_volume() {
        let mut audio = AudioController::new(MockBackend::default(), 0.4);

        assert!(audio.toggle_mute());
        assert!(!audio.toggle_mute());
        assert_eq!(audio.backend.calls, vec![Call::Volume(0.0), Call::Volume(0.4)]);
    }

    #[test]
    fn volume_changes_while_muted_apply_on_unmute() {
        let mut audio = AudioController::new(MockBackend::default(), 0.7);
        audio.toggle_mute();
        audio.set_volume(1.5);
        audio.toggle_mute();

        assert_eq!(audio.volume(), 1.0);
        assert_eq!(audio.backend.calls, vec![Call::Volume(0.0), Call::Volume(1.0)]);
    }

    #[test]
    fn starting_muted_plays_silently() {
        let file = music_file();
        let mut audio = AudioController::new(MockBackend::default(), 0.7);
        audio.toggle_mute();
        audio.play_music(file.path()).unwrap();

        assert_eq!(audio.backend.calls.last(), Some(&Call::Play(0.0)));
    }

    #[test]
    fn stop_only_when_playing() {
        let file = music_file();
        let mut audio = AudioController::new(MockBackend::default(), 0.7);
        audio.stop();
        assert!(audio.backend.calls.is_empty());

        audio.play_music(file.path()).unwrap();
        audio.stop();
        audio.stop();
        assert_eq!(audio.backend.calls, vec![Call::Play(0.7), Call::Stop]);
        assert!(!audio.is_playing());
    }
}
