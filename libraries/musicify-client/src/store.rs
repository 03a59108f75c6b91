//! Optimistic playlist state.
//!
//! [`PlaylistStore`] owns the client's view of playlists: the open playlist
//! (`current`) and the sidebar collection (`playlists`). State changes only
//! through the store's named operations, and every change is announced on a
//! broadcast channel so views can re-read.
//!
//! Song removal and playlist deletion are optimistic. The edit lands locally
//! before the request is sent, the caller gets a [`PendingMutation`] back at
//! once, and a background task reconciles when the server answers:
//!
//! | answer            | remove-song                  | delete-playlist            |
//! |-------------------|------------------------------|----------------------------|
//! | success           | refresh the playlist list    | nothing                    |
//! | `success: false`  | restore the playlist snapshot| restore the list snapshot  |
//! | no answer         | re-fetch the playlist        | re-fetch the playlist list |
//!
//! Concurrent edits are not coalesced. Each one carries its own snapshot and
//! its own reconciliation, and the last one applied is what is shown.

use crate::error::Result;
use crate::playlists::PlaylistRemote;
use crate::types::{MutationResponse, NewPlaylist, PlaylistDetail, PlaylistSummary};
use async_trait::async_trait;
use musicify_core::{PlaylistId, SongId};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{broadcast, oneshot};
use tracing::{debug, info, warn};

const EVENT_CAPACITY: usize = 64;

/// Everything the store holds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreState {
    pub current: Option<PlaylistDetail>,
    pub playlists: Vec<PlaylistSummary>,
}

/// Change notifications; subscribers re-read the store on receipt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// The open playlist was loaded, replaced, or restored
    CurrentChanged(Option<PlaylistId>),
    /// The playlist collection was refreshed or restored
    PlaylistsChanged,
    /// An optimistic edit was applied locally
    MutationApplied { playlist_id: PlaylistId },
    /// The server answered (or failed to) and reconciliation finished
    MutationSettled {
        playlist_id: PlaylistId,
        outcome: MutationOutcome,
    },
}

/// What the caller learns synchronously
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationStatus {
    AppliedLocally,
}

/// How local state was brought back in line after a failed mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// The pre-mutation snapshot was put back
    SnapshotRestored,
    /// Local state was replaced by a fresh server read
    Refetched,
    /// The target is no longer held locally; nothing was touched
    Skipped,
    /// The re-fetch after a transport failure failed as well
    RefetchFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Confirmed,
    Reverted(Reconciliation),
}

/// Handle to an optimistic mutation whose network leg is still running
#[derive(Debug)]
pub struct PendingMutation {
    status: MutationStatus,
    outcome: oneshot::Receiver<MutationOutcome>,
}

impl PendingMutation {
    pub fn status(&self) -> MutationStatus {
        self.status
    }

    /// Wait for the server's answer and the reconciliation that followed.
    ///
    /// Dropping the handle instead is fine; reconciliation still runs.
    pub async fn outcome(self) -> MutationOutcome {
        match self.outcome.await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!("Mutation task ended without reporting an outcome");
                MutationOutcome::Reverted(Reconciliation::Skipped)
            }
        }
    }
}

/// A mutation that is applied locally first and reconciled later.
#[async_trait]
pub trait OptimisticCommand: Send + Sync + 'static {
    /// Whatever `on_rejected` needs to put things back
    type Snapshot: Send + 'static;

    fn playlist_id(&self) -> PlaylistId;

    /// Edit local state and capture the snapshot. Runs before any I/O.
    fn apply_local(&self, state: &mut StoreState) -> Self::Snapshot;

    async fn send(&self, remote: &dyn PlaylistRemote) -> Result<MutationResponse>;

    async fn on_confirmed(&self, store: &PlaylistStore);

    /// The server answered and refused.
    fn on_rejected(&self, state: &mut StoreState, snapshot: Self::Snapshot) -> Reconciliation;

    /// No answer arrived; the snapshot may be stale, so resynchronize instead.
    async fn on_transport_failure(&self, store: &PlaylistStore) -> Reconciliation;
}

/// Client-side playlist state shared by every view.
///
/// Cloning is cheap and clones share state.
#[derive(Clone)]
pub struct PlaylistStore {
    state: Arc<Mutex<StoreState>>,
    remote: Arc<dyn PlaylistRemote>,
    events: broadcast::Sender<StoreEvent>,
}

impl PlaylistStore {
    pub fn new(remote: Arc<dyn PlaylistRemote>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(StoreState::default())),
            remote,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub fn snapshot(&self) -> StoreState {
        self.lock().clone()
    }

    pub fn current(&self) -> Option<PlaylistDetail> {
        self.lock().current.clone()
    }

    pub fn current_id(&self) -> Option<PlaylistId> {
        self.lock().current.as_ref().map(|playlist| playlist.id)
    }

    pub fn playlists(&self) -> Vec<PlaylistSummary> {
        self.lock().playlists.clone()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, event: StoreEvent) {
        // No subscribers is not an error
        let _ = self.events.send(event);
    }

    /// Fetch a playlist with its songs and make it the open one.
    pub async fn load_playlist(&self, id: PlaylistId) -> Result<PlaylistDetail> {
        let playlist = self.remote.get(id).await?;
        debug!(playlist_id = id, songs = playlist.songs.len(), "Loaded playlist");

        self.lock().current = Some(playlist.clone());
        self.publish(StoreEvent::CurrentChanged(Some(id)));
        Ok(playlist)
    }

    /// Replace the playlist collection with the server's.
    pub async fn refresh_playlists(&self) -> Result<()> {
        let playlists = self.remote.list().await?;
        debug!(playlists = playlists.len(), "Refreshed playlists");

        self.lock().playlists = playlists;
        self.publish(StoreEvent::PlaylistsChanged);
        Ok(())
    }

    /// Create a playlist, then refresh the collection.
    pub async fn create_playlist(&self, playlist: NewPlaylist) -> Result<PlaylistSummary> {
        let created = self.remote.create(playlist).await?;
        info!(playlist_id = created.id, "Playlist created");

        if let Err(e) = self.refresh_playlists().await {
            warn!(error = %e, "Failed to refresh playlists after create");
        }
        Ok(created)
    }

    /// Add a song. Not optimistic: local state follows the server's answer.
    pub async fn add_song(
        &self,
        playlist_id: PlaylistId,
        song_id: SongId,
    ) -> Result<MutationResponse> {
        let response = self.remote.add_song(playlist_id, song_id).await?;
        if !response.success {
            return Ok(response);
        }

        if self.current_id() == Some(playlist_id) {
            if let Err(e) = self.load_playlist(playlist_id).await {
                warn!(playlist_id, error = %e, "Failed to reload playlist after add");
            }
        }
        if let Err(e) = self.refresh_playlists().await {
            warn!(error = %e, "Failed to refresh playlists after add");
        }
        Ok(response)
    }

    /// Remove a song from a playlist, optimistically.
    pub fn remove_song(&self, playlist_id: PlaylistId, song_id: SongId) -> PendingMutation {
        self.dispatch(RemoveSongCommand::new(playlist_id, song_id))
    }

    /// Delete a playlist, optimistically.
    pub fn delete_playlist(&self, playlist_id: PlaylistId) -> PendingMutation {
        self.dispatch(DeletePlaylistCommand::new(playlist_id))
    }

    /// Apply `command` locally now and reconcile on a background task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch<C: OptimisticCommand>(&self, command: C) -> PendingMutation {
        let playlist_id = command.playlist_id();
        let snapshot = {
            let mut state = self.lock();
            command.apply_local(&mut state)
        };
        self.publish(StoreEvent::MutationApplied { playlist_id });

        let (tx, rx) = oneshot::channel();
        let store = self.clone();
        tokio::spawn(async move {
            let outcome = store.settle(&command, snapshot).await;
            store.publish(StoreEvent::MutationSettled {
                playlist_id,
                outcome: outcome.clone(),
            });
            let _ = tx.send(outcome);
        });

        PendingMutation {
            status: MutationStatus::AppliedLocally,
            outcome: rx,
        }
    }

    async fn settle<C: OptimisticCommand>(
        &self,
        command: &C,
        snapshot: C::Snapshot,
    ) -> MutationOutcome {
        let playlist_id = command.playlist_id();

        match command.send(self.remote.as_ref()).await {
            Ok(response) if response.success => {
                debug!(playlist_id, "Mutation confirmed");
                command.on_confirmed(self).await;
                MutationOutcome::Confirmed
            }
            Ok(response) => {
                warn!(playlist_id, message = ?response.message, "Mutation refused, reverting");
                MutationOutcome::Reverted(self.reject(command, snapshot))
            }
            Err(e) if e.is_transport() => {
                warn!(playlist_id, error = %e, "Mutation request failed, resynchronizing");
                MutationOutcome::Reverted(command.on_transport_failure(self).await)
            }
            Err(e) => {
                warn!(playlist_id, error = %e, "Mutation failed on server, reverting");
                MutationOutcome::Reverted(self.reject(command, snapshot))
            }
        }
    }

    fn reject<C: OptimisticCommand>(&self, command: &C, snapshot: C::Snapshot) -> Reconciliation {
        let (reconciliation, current_id) = {
            let mut state = self.lock();
            let reconciliation = command.on_rejected(&mut state, snapshot);
            (reconciliation, state.current.as_ref().map(|p| p.id))
        };

        if reconciliation == Reconciliation::SnapshotRestored {
            self.publish(StoreEvent::CurrentChanged(current_id));
            self.publish(StoreEvent::PlaylistsChanged);
        }
        reconciliation
    }
}

/// Drop one song from the open playlist
#[derive(Debug, Clone)]
pub struct RemoveSongCommand {
    playlist_id: PlaylistId,
    song_id: SongId,
}

impl RemoveSongCommand {
    pub fn new(playlist_id: PlaylistId, song_id: SongId) -> Self {
        Self {
            playlist_id,
            song_id,
        }
    }

    fn is_open(&self, state: &StoreState) -> bool {
        state
            .current
            .as_ref()
            .is_some_and(|playlist| playlist.id == self.playlist_id)
    }
}

#[async_trait]
impl OptimisticCommand for RemoveSongCommand {
    /// The open playlist before the edit; `None` if another one was open
    type Snapshot = Option<PlaylistDetail>;

    fn playlist_id(&self) -> PlaylistId {
        self.playlist_id
    }

    fn apply_local(&self, state: &mut StoreState) -> Self::Snapshot {
        let Some(playlist) = state
            .current
            .as_mut()
            .filter(|playlist| playlist.id == self.playlist_id)
        else {
            return None;
        };

        let snapshot = playlist.clone();
        playlist.songs.retain(|song| song.id != self.song_id);
        Some(snapshot)
    }

    async fn send(&self, remote: &dyn PlaylistRemote) -> Result<MutationResponse> {
        remote.remove_song(self.playlist_id, self.song_id).await
    }

    async fn on_confirmed(&self, store: &PlaylistStore) {
        if let Err(e) = store.refresh_playlists().await {
            warn!(error = %e, "Failed to refresh playlists after song removal");
        }
    }

    fn on_rejected(&self, state: &mut StoreState, snapshot: Self::Snapshot) -> Reconciliation {
        match snapshot {
            Some(snapshot) if self.is_open(state) => {
                state.current = Some(snapshot);
                Reconciliation::SnapshotRestored
            }
            _ => Reconciliation::Skipped,
        }
    }

    async fn on_transport_failure(&self, store: &PlaylistStore) -> Reconciliation {
        if store.current_id() != Some(self.playlist_id) {
            return Reconciliation::Skipped;
        }

        match store.load_playlist(self.playlist_id).await {
            Ok(_) => Reconciliation::Refetched,
            Err(e) => Reconciliation::RefetchFailed(e.to_string()),
        }
    }
}

/// Drop a playlist from the collection (and close it if it is open)
#[derive(Debug, Clone)]
pub struct DeletePlaylistCommand {
    playlist_id: PlaylistId,
}

impl DeletePlaylistCommand {
    pub fn new(playlist_id: PlaylistId) -> Self {
        Self { playlist_id }
    }
}

/// Collection before a delete, plus the open playlist if it was the one deleted
#[derive(Debug)]
pub struct DeleteSnapshot {
    playlists: Vec<PlaylistSummary>,
    closed: Option<PlaylistDetail>,
}

#[async_trait]
impl OptimisticCommand for DeletePlaylistCommand {
    type Snapshot = DeleteSnapshot;

    fn playlist_id(&self) -> PlaylistId {
        self.playlist_id
    }

    fn apply_local(&self, state: &mut StoreState) -> Self::Snapshot {
        let playlists = state.playlists.clone();
        state.playlists.retain(|playlist| playlist.id != self.playlist_id);

        let closed = if state
            .current
            .as_ref()
            .is_some_and(|playlist| playlist.id == self.playlist_id)
        {
            state.current.take()
        } else {
            None
        };

        DeleteSnapshot { playlists, closed }
    }

    async fn send(&self, remote: &dyn PlaylistRemote) -> Result<MutationResponse> {
        remote.delete(self.playlist_id).await
    }

    async fn on_confirmed(&self, _store: &PlaylistStore) {
        info!(playlist_id = self.playlist_id, "Playlist deleted");
    }

    fn on_rejected(&self, state: &mut StoreState, snapshot: Self::Snapshot) -> Reconciliation {
        state.playlists = snapshot.playlists;
        // Reopen only if nothing else was opened meanwhile
        if state.current.is_none() {
            state.current = snapshot.closed;
        }
        Reconciliation::SnapshotRestored
    }

    async fn on_transport_failure(&self, store: &PlaylistStore) -> Reconciliation {
        match store.refresh_playlists().await {
            Ok(()) => Reconciliation::Refetched,
            Err(e) => Reconciliation::RefetchFailed(e.to_string()),
        }
    }
}
