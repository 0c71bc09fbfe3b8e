use crate::game::interaction::InteractionOutcome;
use crate::game::state_manager::KeypadResult;
use kira::sound::static_sound::StaticSoundData;
use kira::sound::static_sound::StaticSoundHandle;
use kira::{AudioManager, AudioManagerSettings, Decibels, DefaultBackend, Tween};
use std::collections::HashMap;
use std::error::Error;
use std::path::Path;

/// Short one-shot sounds played in response to interactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    KeypadBeep,
    Accepted,
    Denied,
    Pickup,
    Door,
    Solved,
    Footstep,
}

impl SoundCue {
    pub const ALL: [SoundCue; 7] = [
        SoundCue::KeypadBeep,
        SoundCue::Accepted,
        SoundCue::Denied,
        SoundCue::Pickup,
        SoundCue::Door,
        SoundCue::Solved,
        SoundCue::Footstep,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            SoundCue::KeypadBeep => "keypad_beep.ogg",
            SoundCue::Accepted => "accepted.ogg",
            SoundCue::Denied => "denied.ogg",
            SoundCue::Pickup => "pickup.ogg",
            SoundCue::Door => "door.ogg",
            SoundCue::Solved => "solved.ogg",
            SoundCue::Footstep => "footstep.ogg",
        }
    }

    pub fn for_interaction(outcome: &InteractionOutcome) -> Option<SoundCue> {
        match outcome {
            InteractionOutcome::OpenKeypad { .. } => Some(SoundCue::KeypadBeep),
            InteractionOutcome::PickedUp(_) => Some(SoundCue::Pickup),
            InteractionOutcome::Moved { .. } => Some(SoundCue::Door),
            InteractionOutcome::DoorRefused(_) | InteractionOutcome::WrongLight { .. } => {
                Some(SoundCue::Denied)
            }
            InteractionOutcome::CubeTurned { solved: true, .. } => Some(SoundCue::Solved),
            InteractionOutcome::CubeTurned { .. } => Some(SoundCue::KeypadBeep),
            _ => None,
        }
    }

    pub fn for_keypad(result: KeypadResult) -> SoundCue {
        match result {
            KeypadResult::Accepted => SoundCue::Accepted,
            KeypadResult::Rejected => SoundCue::Denied,
            KeypadResult::AlreadySolved => SoundCue::KeypadBeep,
        }
    }
}

/// Converts a linear `[0, 1]` volume into kira's decibel scale.
pub fn volume_to_decibels(volume: f32) -> Decibels {
    if volume <= 0.0 {
        return Decibels::SILENCE;
    }
    Decibels(20.0 * volume.min(1.0).log10())
}

pub struct GameAudioManager {
    audio_manager: AudioManager<DefaultBackend>,
    cues: HashMap<SoundCue, StaticSoundData>,
    footstep_sound: Option<StaticSoundHandle>,
    is_walking: bool,
}

impl GameAudioManager {
    /// Starts the audio backend and loads every cue found in `audio_dir`.
    ///
    /// Only a backend failure is an error. Missing or unreadable sound files are logged and
    /// that cue stays silent.
    pub fn new(audio_dir: &Path, volume: f32) -> Result<Self, Box<dyn Error>> {
        let mut audio_manager =
            AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())?;
        audio_manager
            .main_track()
            .set_volume(volume_to_decibels(volume), Tween::default());

        let mut cues = HashMap::new();
        for cue in SoundCue::ALL {
            let path = audio_dir.join(cue.file_name());
            match StaticSoundData::from_file(&path) {
                Ok(data) => {
                    cues.insert(cue, data);
                }
                Err(e) => log::warn!("Sound {:?} unavailable ({}): {}", cue, path.display(), e),
            }
        }
        log::info!("Audio ready with {}/{} cues", cues.len(), SoundCue::ALL.len());

        Ok(GameAudioManager {
            audio_manager,
            cues,
            footstep_sound: None,
            is_walking: false,
        })
    }

    pub fn play(&mut self, cue: SoundCue) -> Result<(), Box<dyn Error>> {
        if let Some(data) = self.cues.get(&cue) {
            self.audio_manager.play(data.clone())?;
        }
        Ok(())
    }

    pub fn start_walking(&mut self) -> Result<(), Box<dyn Error>> {
        if self.is_walking {
            return Ok(());
        }
        self.is_walking = true;
        if let Some(data) = self.cues.get(&SoundCue::Footstep) {
            let length = data.duration().as_secs_f64();
            let sound_handle = self
                .audio_manager
                .play(data.clone().loop_region(0.0..length))?;
            self.footstep_sound = Some(sound_handle);
        }
        Ok(())
    }

    pub fn stop_walking(&mut self) -> Result<(), Box<dyn Error>> {
        if self.is_walking {
            self.is_walking = false;
            if let Some(mut handle) = self.footstep_sound.take() {
                handle.stop(Tween::default());
            }
        }
        Ok(())
    }

    pub fn is_walking(&self) -> bool {
        self.is_walking
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::scene::SceneError;

    #[test]
    fn full_volume_is_zero_decibels() {
        assert_eq!(volume_to_decibels(1.0), Decibels(0.0));
        assert_eq!(volume_to_decibels(0.0), Decibels::SILENCE);
        assert!((volume_to_decibels(0.1).0 + 20.0).abs() < 1e-4);
    }

    #[test]
    fn outcomes_map_to_cues() {
        assert_eq!(
            SoundCue::for_interaction(&InteractionOutcome::PickedUp("key".into())),
            Some(SoundCue::Pickup)
        );
        assert_eq!(
            SoundCue::for_interaction(&InteractionOutcome::DoorRefused(
                SceneError::NoTransition { from: 0, to: 1 }
            )),
            Some(SoundCue::Denied)
        );
        assert_eq!(
            SoundCue::for_interaction(&InteractionOutcome::CubeTurned {
                puzzle: "p".into(),
                solved: true
            }),
            Some(SoundCue::Solved)
        );
        assert_eq!(SoundCue::for_interaction(&InteractionOutcome::Nothing), None);
        assert_eq!(SoundCue::for_keypad(KeypadResult::Rejected), SoundCue::Denied);
    }

    #[test]
    fn cue_files_are_distinct() {
        let mut names: Vec<_> = SoundCue::ALL.iter().map(|cue| cue.file_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), SoundCue::ALL.len());
    }
}
