//! Recording listing and offline conversion handlers

use std::path::Path;

use crate::application::ports::RecordingsApi;
use crate::application::Transcoder;
use crate::domain::recording::{format_file_size, AudioFormat, MimeType};
use crate::infrastructure::{ApiClient, ContainerDecoder};

use super::presenter::Presenter;

/// List what the server has stored
pub async fn handle_list(client: &ApiClient, presenter: &Presenter) -> Result<(), String> {
    let entries = client.list().await.map_err(|e| e.to_string())?;
    presenter.recordings(&entries);
    Ok(())
}

/// Content type guessed from a file extension
pub fn mime_for_path(path: &Path) -> Option<MimeType> {
    let ext = path.extension()?.to_str()?;
    AudioFormat::from_extension(ext).map(|format| MimeType::new(format.mime_str()))
}

/// Convert a local audio file to 16-bit PCM WAV
pub async fn handle_convert(input: &Path, output: &Path, presenter: &Presenter) -> Result<(), String> {
    let mime_type = mime_for_path(input)
        .ok_or_else(|| format!("Cannot tell the audio format of {}", input.display()))?;
    let source = tokio::fs::read(input)
        .await
        .map_err(|e| format!("Failed to read {}: {}", input.display(), e))?;

    let wav = tokio::task::spawn_blocking(move || {
        Transcoder::new(ContainerDecoder::new()).to_wav(&source, &mime_type)
    })
    .await
    .map_err(|e| format!("Conversion task failed: {}", e))?
    .map_err(|e| e.to_string())?;

    tokio::fs::write(output, &wav)
        .await
        .map_err(|e| format!("Failed to write {}: {}", output.display(), e))?;
    presenter.success(&format!(
        "Wrote {} ({})",
        output.display(),
        format_file_size(wav.len() as u64)
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audio::{encode_wav, PcmBuffer};

    #[test]
    fn mime_from_extension() {
        assert_eq!(mime_for_path(Path::new("a.FLAC")), Some(MimeType::new("audio/flac")));
        assert_eq!(mime_for_path(Path::new("take.mp3")), Some(MimeType::new("audio/mpeg")));
        assert_eq!(mime_for_path(Path::new("notes.txt")), None);
        assert_eq!(mime_for_path(Path::new("noext")), None);
    }

    #[tokio::test]
    async fn converts_wav_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.wav");
        let output = dir.path().join("out.wav");
        let pcm = PcmBuffer::new(vec![vec![0.1; 10], vec![-0.1; 10]], 44_100).unwrap();
        std::fs::write(&input, encode_wav(&pcm)).unwrap();

        handle_convert(&input, &output, &Presenter::new()).await.unwrap();
        assert_eq!(std::fs::read(&output).unwrap().len(), 44 + 2 * 2 * 10);
    }

    #[tokio::test]
    async fn unknown_extension_is_rejected() {
        let err = handle_convert(Path::new("x.doc"), Path::new("y.wav"), &Presenter::new())
            .await
            .unwrap_err();
        assert!(err.contains("Cannot tell"));
    }
}
