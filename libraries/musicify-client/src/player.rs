//! Playback state machine.
//!
//! The machine knows nothing about audio output. Events go in, the new state
//! is recorded, and the side effects the host must perform come back out as
//! [`PlayerAction`]s (load this URL, fetch these lyrics, start playing).
//!
//! ```text
//! Idle --TrackSelected--> Loading --MetadataLoaded--> Ready <--Pause/Play--> Playing
//!                            ^                                                  |
//!                            +------------ Next/Previous/advance ----- PlaybackEnded --> Ended
//! ```

use musicify_core::{Song, SongId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

const DEFAULT_VOLUME: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Loading,
    Ready,
    Playing,
    Ended,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoopMode {
    /// Play through the queue once
    #[default]
    NoLoop,
    /// Play each track twice before moving on
    LoopOne,
    /// Repeat the current track; next/previous wrap around the queue
    LoopAll,
}

impl LoopMode {
    /// NoLoop -> LoopOne -> LoopAll -> NoLoop
    pub fn next(self) -> Self {
        match self {
            Self::NoLoop => Self::LoopOne,
            Self::LoopOne => Self::LoopAll,
            Self::LoopAll => Self::NoLoop,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    TrackSelected(SongId),
    MetadataLoaded { duration_ms: u64 },
    Play,
    Pause,
    PlaybackEnded,
    Next,
    Previous,
}

/// Side effects for the host to carry out, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerAction {
    LoadSource { url: String },
    FetchLyrics { url: String },
    ClearLyrics,
    StartPlayback,
    PausePlayback,
    /// Seek to the start of the current source
    Restart,
}

pub struct PlayerMachine {
    queue: Vec<Song>,
    current: Option<Song>,
    state: PlayerState,
    play_on_load: bool,
    loop_mode: LoopMode,
    replays: u8,
    shuffle: bool,
    volume: f32,
    muted: bool,
    previous_volume: f32,
    lyrics_source: Option<String>,
    duration_ms: Option<u64>,
    rng: StdRng,
}

impl Default for PlayerMachine {
    fn default() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl PlayerMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deterministic shuffle order
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            queue: Vec::new(),
            current: None,
            state: PlayerState::Idle,
            play_on_load: false,
            loop_mode: LoopMode::NoLoop,
            replays: 0,
            shuffle: false,
            volume: DEFAULT_VOLUME,
            muted: false,
            previous_volume: 1.0,
            lyrics_source: None,
            duration_ms: None,
            rng,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn current_track(&self) -> Option<&Song> {
        self.current.as_ref()
    }

    pub fn queue(&self) -> &[Song] {
        &self.queue
    }

    pub fn duration_ms(&self) -> Option<u64> {
        self.duration_ms
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Volume the output should actually use
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }

    /// Replace the queue. The current track keeps playing even if it is gone
    /// from the new queue.
    pub fn set_queue(&mut self, songs: Vec<Song>) {
        self.queue = songs;
    }

    /// Replace the queue and start its first track.
    pub fn play_queue(&mut self, songs: Vec<Song>) -> Vec<PlayerAction> {
        self.set_queue(songs);
        match self.queue.first().cloned() {
            Some(first) => self.load(first),
            None => Vec::new(),
        }
    }

    pub fn toggle_loop_mode(&mut self) -> LoopMode {
        self.loop_mode = self.loop_mode.next();
        self.replays = 0;
        self.loop_mode
    }

    pub fn toggle_shuffle(&mut self) -> bool {
        self.shuffle = !self.shuffle;
        self.shuffle
    }

    /// Set volume, clamped to 0..=1. A positive level unmutes.
    pub fn set_volume(&mut self, level: f32) {
        if level.is_nan() {
            return;
        }
        self.volume = level.clamp(0.0, 1.0);
        if self.volume > 0.0 && self.muted {
            self.muted = false;
        }
    }

    /// Mute, or unmute restoring the volume from before muting if the
    /// level was dragged to zero meanwhile.
    pub fn toggle_mute(&mut self) -> bool {
        if self.muted {
            self.muted = false;
            if self.volume <= 0.0 {
                self.volume = if self.previous_volume > 0.0 {
                    self.previous_volume
                } else {
                    DEFAULT_VOLUME
                };
            }
        } else {
            self.previous_volume = self.volume;
            self.muted = true;
        }
        self.muted
    }

    pub fn handle(&mut self, event: PlayerEvent) -> Vec<PlayerAction> {
        debug!(?event, state = ?self.state, "Player event");

        match event {
            PlayerEvent::TrackSelected(id) => self.select(id),
            PlayerEvent::MetadataLoaded { duration_ms } => self.metadata_loaded(duration_ms),
            PlayerEvent::Play => self.play(),
            PlayerEvent::Pause => self.pause(),
            PlayerEvent::PlaybackEnded => self.ended(),
            PlayerEvent::Next => self.next(),
            PlayerEvent::Previous => self.previous(),
        }
    }

    fn current_index(&self) -> Option<usize> {
        let current = self.current.as_ref()?;
        self.queue.iter().position(|song| song.id == current.id)
    }

    /// Switch to `song` and play it as soon as it has loaded
    fn load(&mut self, song: Song) -> Vec<PlayerAction> {
        let mut actions = vec![PlayerAction::LoadSource {
            url: song.file.clone(),
        }];

        match &song.lrc_file {
            Some(lrc) if self.lyrics_source.as_deref() != Some(lrc.as_str()) => {
                actions.push(PlayerAction::ClearLyrics);
                actions.push(PlayerAction::FetchLyrics { url: lrc.clone() });
                self.lyrics_source = Some(lrc.clone());
            }
            Some(_) => {}
            None => {
                if self.lyrics_source.take().is_some() {
                    actions.push(PlayerAction::ClearLyrics);
                }
            }
        }

        self.current = Some(song);
        self.state = PlayerState::Loading;
        self.play_on_load = true;
        self.replays = 0;
        self.duration_ms = None;
        actions
    }

    fn select(&mut self, id: SongId) -> Vec<PlayerAction> {
        let Some(song) = self.queue.iter().find(|song| song.id == id).cloned() else {
            warn!(song_id = id, "Selected track is not in the queue");
            return Vec::new();
        };

        let same = self.current.as_ref().is_some_and(|current| current.id == id);
        if !same {
            return self.load(song);
        }

        match self.state {
            PlayerState::Playing => Vec::new(),
            PlayerState::Idle => self.load(song),
            _ => self.play(),
        }
    }

    fn metadata_loaded(&mut self, duration_ms: u64) -> Vec<PlayerAction> {
        if self.state != PlayerState::Loading {
            return Vec::new();
        }

        self.duration_ms = Some(duration_ms);
        if self.play_on_load {
            self.play_on_load = false;
            self.state = PlayerState::Playing;
            vec![PlayerAction::StartPlayback]
        } else {
            self.state = PlayerState::Ready;
            Vec::new()
        }
    }

    fn play(&mut self) -> Vec<PlayerAction> {
        match self.state {
            PlayerState::Ready => {
                self.state = PlayerState::Playing;
                vec![PlayerAction::StartPlayback]
            }
            PlayerState::Ended => {
                self.state = PlayerState::Playing;
                vec![PlayerAction::Restart, PlayerAction::StartPlayback]
            }
            PlayerState::Loading => {
                self.play_on_load = true;
                Vec::new()
            }
            PlayerState::Idle | PlayerState::Playing => Vec::new(),
        }
    }

    fn pause(&mut self) -> Vec<PlayerAction> {
        match self.state {
            PlayerState::Playing => {
                self.state = PlayerState::Ready;
                vec![PlayerAction::PausePlayback]
            }
            PlayerState::Loading => {
                self.play_on_load = false;
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn ended(&mut self) -> Vec<PlayerAction> {
        if self.state != PlayerState::Playing {
            return Vec::new();
        }

        match self.loop_mode {
            LoopMode::LoopOne if self.replays < 1 => {
                self.replays += 1;
                vec![PlayerAction::Restart, PlayerAction::StartPlayback]
            }
            LoopMode::LoopAll => vec![PlayerAction::Restart, PlayerAction::StartPlayback],
            LoopMode::LoopOne | LoopMode::NoLoop => {
                self.replays = 0;
                self.state = PlayerState::Ended;
                self.advance()
            }
        }
    }

    /// Move on after a track finished: a random other track when shuffling,
    /// otherwise the next one. Stays Ended at the end of the queue.
    fn advance(&mut self) -> Vec<PlayerAction> {
        let len = self.queue.len();
        let index = self.current_index();

        let target = if self.shuffle && len > 1 {
            Some(match index {
                Some(current) => {
                    let pick = self.rng.gen_range(0..len - 1);
                    if pick >= current {
                        pick + 1
                    } else {
                        pick
                    }
                }
                None => self.rng.gen_range(0..len),
            })
        } else {
            index.map(|i| i + 1).filter(|&next| next < len)
        };

        match target.and_then(|i| self.queue.get(i).cloned()) {
            Some(song) => self.load(song),
            None => Vec::new(),
        }
    }

    fn next(&mut self) -> Vec<PlayerAction> {
        let len = self.queue.len();
        let target = match self.current_index() {
            Some(i) if i + 1 < len => Some(i + 1),
            Some(_) if self.loop_mode == LoopMode::LoopAll => Some(0),
            Some(_) => None,
            None => (len > 0).then_some(0),
        };

        match target.and_then(|i| self.queue.get(i).cloned()) {
            Some(song) => self.load(song),
            None => Vec::new(),
        }
    }

    fn previous(&mut self) -> Vec<PlayerAction> {
        let target = match self.current_index() {
            Some(i) if i > 0 => Some(i - 1),
            Some(_) if self.loop_mode == LoopMode::LoopAll => self.queue.len().checked_sub(1),
            _ => None,
        };

        match target.and_then(|i| self.queue.get(i).cloned()) {
            Some(song) => self.load(song),
            None => Vec::new(),
        }
    }
}
