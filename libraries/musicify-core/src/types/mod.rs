mod album;
mod artist;
mod genre;
mod playlist;
mod song;
mod user;

pub use album::{Album, AlbumId, CreateAlbum, UpdateAlbum};
pub use artist::{Artist, ArtistId, CreateArtist, UpdateArtist};
pub use genre::{CreateGenre, Genre, GenreId, UpdateGenre};
pub use playlist::{CreatePlaylist, Playlist, PlaylistId, PlaylistSummary, UpdatePlaylist};
pub use song::{NewSong, Song, SongId, SongUpdate};
pub use user::{UpsertUser, User, UserId};
