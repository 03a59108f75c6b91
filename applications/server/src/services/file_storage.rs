/// File storage service - keeps uploaded media on local disk
///
/// Files land in `audio/`, `images/` or `lyrics/` under the media root with
/// a random name and are served back under the public base URL.
use async_trait::async_trait;
use musicify_core::{MediaKind, MusicifyError, ObjectUploader, UploadFile, UploadedObject};
use std::path::PathBuf;
use tokio::fs;

#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
    public_base_url: String,
}

impl FileStorage {
    pub fn new(base_path: PathBuf, public_base_url: impl Into<String>) -> Self {
        Self {
            base_path,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create one directory per media kind
    pub async fn initialize(&self) -> std::io::Result<()> {
        for kind in [MediaKind::Audio, MediaKind::Image, MediaKind::Lyrics] {
            fs::create_dir_all(self.base_path.join(kind.folder())).await?;
        }
        Ok(())
    }

    fn extension_for(file: &UploadFile, kind: MediaKind) -> String {
        if let Some(ext) = file.extension().filter(|e| e.chars().all(|c| c.is_ascii_alphanumeric())) {
            return ext;
        }

        file.content_type
            .as_deref()
            .and_then(|ct| mime_guess::get_mime_extensions_str(ct))
            .and_then(|exts| exts.first())
            .map_or_else(
                || match kind {
                    MediaKind::Audio => "mp3".to_string(),
                    MediaKind::Image => "jpg".to_string(),
                    MediaKind::Lyrics => "lrc".to_string(),
                },
                |ext| (*ext).to_string(),
            )
    }
}

/// Read the audio duration in seconds; `None` when the file is not audio lofty understands
async fn probe_duration(path: PathBuf) -> Option<f64> {
    tokio::task::spawn_blocking(move || {
        use lofty::AudioFile;

        match lofty::read_from_path(&path) {
            Ok(tagged_file) => Some(tagged_file.properties().duration().as_secs_f64()),
            Err(e) => {
                tracing::debug!("Could not read duration from {:?}: {}", path, e);
                None
            }
        }
    })
    .await
    .ok()
    .flatten()
}

#[async_trait]
impl ObjectUploader for FileStorage {
    async fn upload(&self, file: UploadFile, kind: MediaKind) -> musicify_core::Result<UploadedObject> {
        if file.data.is_empty() {
            return Err(MusicifyError::validation(format!(
                "Uploaded file is empty: {}",
                file.file_name
            )));
        }

        let filename = format!("{}.{}", uuid::Uuid::new_v4(), Self::extension_for(&file, kind));
        let dir = self.base_path.join(kind.folder());
        fs::create_dir_all(&dir).await?;

        let path = dir.join(&filename);
        fs::write(&path, &file.data).await?;

        let duration_seconds = match kind {
            MediaKind::Audio => probe_duration(path.clone()).await,
            _ => None,
        };

        tracing::debug!(
            kind = kind.folder(),
            bytes = file.data.len(),
            "Stored upload at {:?}",
            path
        );

        Ok(UploadedObject {
            url: format!("{}/{}/{}", self.public_base_url, kind.folder(), filename),
            duration_seconds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn file(name: &str, content_type: Option<&str>) -> UploadFile {
        UploadFile {
            file_name: name.to_string(),
            content_type: content_type.map(str::to_string),
            data: b"not really audio".to_vec(),
        }
    }

    #[tokio::test]
    async fn test_upload_writes_under_kind_folder() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path().to_path_buf(), "/media/");
        storage.initialize().await.unwrap();

        let uploaded = storage
            .upload(file("cover.PNG", Some("image/png")), MediaKind::Image)
            .await
            .unwrap();

        assert!(uploaded.url.starts_with("/media/images/"));
        assert!(uploaded.url.ends_with(".png"));
        assert_eq!(uploaded.duration_seconds, None);

        let stored = uploaded.url.trim_start_matches("/media/");
        let path = temp_dir.path().join(stored);
        assert_eq!(std::fs::read(path).unwrap(), b"not really audio");
    }

    #[tokio::test]
    async fn test_unreadable_audio_has_no_duration() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path().to_path_buf(), "/media");

        let uploaded = storage
            .upload(file("track.mp3", Some("audio/mpeg")), MediaKind::Audio)
            .await
            .unwrap();

        assert!(uploaded.url.starts_with("/media/audio/"));
        assert_eq!(uploaded.duration_seconds, None);
    }

    #[tokio::test]
    async fn test_empty_upload_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path().to_path_buf(), "/media");

        let empty = UploadFile {
            file_name: "empty.lrc".to_string(),
            content_type: None,
            data: Vec::new(),
        };
        assert!(storage.upload(empty, MediaKind::Lyrics).await.is_err());
    }

    #[test]
    fn test_extension_fallbacks() {
        assert_eq!(
            FileStorage::extension_for(&file("blob", Some("image/png")), MediaKind::Image),
            "png"
        );
        assert_eq!(
            FileStorage::extension_for(&file("blob", None), MediaKind::Audio),
            "mp3"
        );
        assert_eq!(
            FileStorage::extension_for(&file("lyrics", None), MediaKind::Lyrics),
            "lrc"
        );
    }
}
