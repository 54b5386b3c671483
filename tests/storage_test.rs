use std::io;

use bytes::Bytes;
use futures::StreamExt;
use futures::stream;

use switchscribe::application::ports::{ArtifactSink, StagingStore, StagingStoreError};
use switchscribe::domain::{AudioChunk, RequestId, StoragePath};
use switchscribe::infrastructure::storage::{
    InMemoryStagingStore, LocalStagingStore, TRANSCRIPT_FILE_NAME, WavArtifactSink,
};

fn byte_stream(
    parts: Vec<&'static [u8]>,
) -> futures::stream::BoxStream<'static, Result<Bytes, io::Error>> {
    stream::iter(parts.into_iter().map(|p| Ok(Bytes::from_static(p)))).boxed()
}

#[tokio::test]
async fn given_streamed_upload_when_staging_locally_then_fetch_returns_all_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStagingStore::new(dir.path().to_path_buf()).unwrap();
    let path = StoragePath::new(&RequestId::new(), "clip.wav");

    let size = store
        .store(&path, byte_stream(vec![b"RIFF", b"....", b"WAVE"]))
        .await
        .unwrap();
    let data = store.fetch(&path).await.unwrap();

    assert_eq!(size, 12);
    assert_eq!(data, Bytes::from_static(b"RIFF....WAVE"));
    assert!(dir.path().join(path.as_str()).exists());
}

#[tokio::test]
async fn given_staged_upload_when_deleting_locally_then_file_is_gone() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStagingStore::new(dir.path().to_path_buf()).unwrap();
    let path = StoragePath::new(&RequestId::new(), "clip.wav");
    store
        .store(&path, byte_stream(vec![b"audio"]))
        .await
        .unwrap();

    store.delete(&path).await.unwrap();

    assert!(!dir.path().join(path.as_str()).exists());
    assert!(matches!(
        store.fetch(&path).await,
        Err(StagingStoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn given_failing_stream_when_staging_locally_then_returns_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStagingStore::new(dir.path().to_path_buf()).unwrap();
    let path = StoragePath::new(&RequestId::new(), "clip.wav");
    let failing = stream::iter(vec![
        Ok(Bytes::from_static(b"partial")),
        Err(io::Error::other("connection reset")),
    ])
    .boxed();

    let result = store.store(&path, failing).await;

    assert!(matches!(result, Err(StagingStoreError::Io(_))));
}

#[tokio::test]
async fn given_in_memory_store_when_staging_and_deleting_then_tracks_objects() {
    let store = InMemoryStagingStore::new();
    let path = StoragePath::new(&RequestId::new(), "clip.wav");

    store
        .store(&path, byte_stream(vec![b"ab", b"cd"]))
        .await
        .unwrap();
    assert_eq!(store.len().await, 1);
    assert_eq!(store.fetch(&path).await.unwrap(), Bytes::from_static(b"abcd"));

    store.delete(&path).await.unwrap();
    assert!(store.is_empty().await);
    assert!(matches!(
        store.delete(&path).await,
        Err(StagingStoreError::DeleteFailed(_))
    ));
}

#[test]
fn given_chunk_when_storing_artifact_then_writes_readable_wav() {
    let dir = tempfile::tempdir().unwrap();
    let sink = WavArtifactSink::new(dir.path());
    let id = RequestId::new();
    let chunk = AudioChunk::new(3, 1_440_000, 16_000, vec![0.5; 1_600]);

    sink.store_chunk(&id, &chunk).unwrap();

    let path = sink.chunk_path(&id, 3);
    assert!(path.ends_with("chunk_0003.wav"));
    let mut reader = hound::WavReader::open(&path).unwrap();
    assert_eq!(reader.spec().sample_rate, 16_000);
    assert_eq!(reader.spec().channels, 1);
    let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(samples.len(), 1_600);
    assert_eq!(samples[0], (0.5 * i16::MAX as f32) as i16);
}

#[test]
fn given_transcript_when_storing_artifact_then_writes_text_file() {
    let dir = tempfile::tempdir().unwrap();
    let sink = WavArtifactSink::new(dir.path());
    let id = RequestId::new();

    sink.store_transcript(&id, "hola my friend").unwrap();

    let written =
        std::fs::read_to_string(sink.request_dir(&id).join(TRANSCRIPT_FILE_NAME)).unwrap();
    assert_eq!(written, "hola my friend");
}
