//! Short sound cues.
//!
//! Clips are read lazily and cached by key. Playback goes through rodio when
//! the `audio` feature is enabled; without it, or when no output device can be
//! opened, cues are resolved and then skipped.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use super::AssetError;

/// Sound file name relative to the sounds directory, e.g. `pop.wav`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SoundKey(pub String);

impl SoundKey {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self(file_name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub struct AudioOutput {
    sounds_dir: PathBuf,
    #[cfg(feature = "audio")]
    stream: Option<rodio::OutputStream>,
    clips: HashMap<SoundKey, Option<Arc<[u8]>>>,
    warned_keys: HashSet<SoundKey>,
}

impl AudioOutput {
    /// Opens the default output device. A missing device degrades to silence.
    #[cfg(feature = "audio")]
    pub fn open(sounds_dir: PathBuf) -> Self {
        let mut output = Self::silent(sounds_dir);
        match rodio::OutputStreamBuilder::open_default_stream() {
            Ok(stream) => output.stream = Some(stream),
            Err(error) => warn!(error = %error, "audio_device_unavailable"),
        }
        output
    }

    #[cfg(not(feature = "audio"))]
    pub fn open(sounds_dir: PathBuf) -> Self {
        debug!("audio_feature_disabled");
        Self::silent(sounds_dir)
    }

    pub fn silent(sounds_dir: PathBuf) -> Self {
        Self {
            sounds_dir,
            #[cfg(feature = "audio")]
            stream: None,
            clips: HashMap::new(),
            warned_keys: HashSet::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        #[cfg(feature = "audio")]
        {
            self.stream.is_some()
        }
        #[cfg(not(feature = "audio"))]
        {
            false
        }
    }

    /// Loads and validates a clip ahead of first use.
    pub fn preload(&mut self, key: &SoundKey) -> Result<(), AssetError> {
        if let Some(Some(_)) = self.clips.get(key) {
            return Ok(());
        }
        let path = self.sounds_dir.join(key.as_str());
        match load_clip(&path) {
            Ok(bytes) => {
                self.clips.insert(key.clone(), Some(bytes));
                Ok(())
            }
            Err(error) => {
                self.clips.insert(key.clone(), None);
                self.warned_keys.insert(key.clone());
                Err(error)
            }
        }
    }

    pub fn play(&mut self, key: &SoundKey) {
        let Some(bytes) = self.resolve_clip(key) else {
            return;
        };
        self.start_playback(key, bytes);
    }

    fn resolve_clip(&mut self, key: &SoundKey) -> Option<Arc<[u8]>> {
        if let Some(cached) = self.clips.get(key) {
            return cached.clone();
        }
        let path = self.sounds_dir.join(key.as_str());
        let clip = match load_clip(&path) {
            Ok(bytes) => Some(bytes),
            Err(error) => {
                warn_clip_once(&mut self.warned_keys, key, &error);
                None
            }
        };
        self.clips.insert(key.clone(), clip.clone());
        clip
    }

    #[cfg(feature = "audio")]
    fn start_playback(&mut self, key: &SoundKey, bytes: Arc<[u8]>) {
        let Some(stream) = self.stream.as_ref() else {
            debug!(sound = key.as_str(), "sound_cue_skipped_no_device");
            return;
        };
        match rodio::Decoder::new(std::io::Cursor::new(bytes)) {
            Ok(source) => {
                stream.mixer().add(source);
                debug!(sound = key.as_str(), "sound_cue_started");
            }
            Err(error) => warn!(sound = key.as_str(), error = %error, "sound_cue_decode_failed"),
        }
    }

    #[cfg(not(feature = "audio"))]
    fn start_playback(&mut self, key: &SoundKey, _bytes: Arc<[u8]>) {
        debug!(sound = key.as_str(), "sound_cue_skipped_audio_disabled");
    }
}

fn load_clip(path: &Path) -> Result<Arc<[u8]>, AssetError> {
    let bytes: Arc<[u8]> = fs::read(path)
        .map_err(|source| AssetError::from_io(path, source))?
        .into();
    validate_clip(path, &bytes)?;
    Ok(bytes)
}

#[cfg(feature = "audio")]
fn validate_clip(path: &Path, bytes: &Arc<[u8]>) -> Result<(), AssetError> {
    rodio::Decoder::new(std::io::Cursor::new(Arc::clone(bytes)))
        .map(|_| ())
        .map_err(|error| AssetError::Decode {
            path: path.to_path_buf(),
            reason: error.to_string(),
        })
}

#[cfg(not(feature = "audio"))]
fn validate_clip(path: &Path, bytes: &Arc<[u8]>) -> Result<(), AssetError> {
    if bytes.is_empty() {
        return Err(AssetError::Decode {
            path: path.to_path_buf(),
            reason: "empty sound file".to_string(),
        });
    }
    Ok(())
}

fn warn_clip_once(warned_keys: &mut HashSet<SoundKey>, key: &SoundKey, error: &AssetError) {
    if !warned_keys.insert(key.clone()) {
        return;
    }
    warn!(
        sound = key.as_str(),
        path = %error.path().display(),
        error = %error,
        "sound_cue_unavailable"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_clip_is_reported_and_cached_as_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut audio = AudioOutput::silent(dir.path().to_path_buf());
        let key = SoundKey::new("pop.wav");

        let error = audio.preload(&key).expect_err("missing");
        assert!(error.is_missing());

        audio.play(&key);
        assert!(matches!(audio.clips.get(&key), Some(None)));
    }

    #[test]
    fn empty_clip_is_a_decode_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("victory.wav"), b"").expect("write");
        let mut audio = AudioOutput::silent(dir.path().to_path_buf());

        let error = audio
            .preload(&SoundKey::new("victory.wav"))
            .expect_err("decode failure");
        assert!(matches!(error, AssetError::Decode { .. }));
    }

    #[test]
    fn silent_output_reports_disabled() {
        let audio = AudioOutput::silent(PathBuf::from("sounds"));
        assert!(!audio.is_enabled());
    }
}
