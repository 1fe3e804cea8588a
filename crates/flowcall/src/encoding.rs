use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::io;
use std::path::{Path, PathBuf};

use crate::errors::{WorkflowError, WorkflowResult};

pub const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// What a file read produced. Some readers hand back raw bytes, others a full data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContents {
    Bytes(Vec<u8>),
    DataUrl(String),
}

/// A named binary resource that can be read in full
#[async_trait]
pub trait FileSource: Send + Sync {
    fn name(&self) -> &str;

    fn media_type(&self) -> &str;

    async fn read(&self) -> io::Result<FileContents>;
}

#[async_trait]
impl<T: FileSource + ?Sized> FileSource for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn media_type(&self) -> &str {
        (**self).media_type()
    }

    async fn read(&self) -> io::Result<FileContents> {
        (**self).read().await
    }
}

#[async_trait]
impl<'a, T: FileSource + ?Sized> FileSource for &'a T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn media_type(&self) -> &str {
        (**self).media_type()
    }

    async fn read(&self) -> io::Result<FileContents> {
        (**self).read().await
    }
}

#[derive(Debug, Clone)]
enum FileBody {
    Memory(Vec<u8>),
    Path(PathBuf),
    DataUrl(String),
}

/// A file supplied by the caller for one invocation
#[derive(Debug, Clone)]
pub struct AttachedFile {
    name: String,
    media_type: String,
    body: FileBody,
}

impl AttachedFile {
    pub fn from_bytes<N: Into<String>, T: Into<String>>(
        name: N,
        media_type: T,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            body: FileBody::Memory(bytes),
        }
    }

    /// The file is only read when the request is assembled. The name is the path's file name.
    pub fn from_path<P: AsRef<Path>, T: Into<String>>(path: P, media_type: T) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            media_type: media_type.into(),
            body: FileBody::Path(path.to_path_buf()),
        }
    }

    /// Media type comes from the data URL header, falling back to octet-stream
    pub fn from_data_url<N: Into<String>, U: Into<String>>(name: N, url: U) -> Self {
        let url = url.into();
        let media_type = url
            .strip_prefix("data:")
            .and_then(|rest| rest.split([';', ',']).next())
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_MEDIA_TYPE)
            .to_string();
        Self {
            name: name.into(),
            media_type,
            body: FileBody::DataUrl(url),
        }
    }
}

#[async_trait]
impl FileSource for AttachedFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn media_type(&self) -> &str {
        &self.media_type
    }

    async fn read(&self) -> io::Result<FileContents> {
        match &self.body {
            FileBody::Memory(bytes) => Ok(FileContents::Bytes(bytes.clone())),
            FileBody::Path(path) => Ok(FileContents::Bytes(tokio::fs::read(path).await?)),
            FileBody::DataUrl(url) => Ok(FileContents::DataUrl(url.clone())),
        }
    }
}

/// Read the whole file and return its content as standard, padded base64
pub async fn encode_file<F: FileSource + ?Sized>(file: &F) -> WorkflowResult<String> {
    let contents = file
        .read()
        .await
        .map_err(|e| WorkflowError::file_read(file.name(), e))?;

    encode_contents(contents).map_err(|e| WorkflowError::file_read(file.name(), e))
}

fn encode_contents(contents: FileContents) -> io::Result<String> {
    match contents {
        FileContents::Bytes(bytes) => Ok(STANDARD.encode(bytes)),
        FileContents::DataUrl(url) => data_url_payload(&url),
    }
}

/// Strip the `data:<type>[;base64],` header and return the payload as base64
fn data_url_payload(url: &str) -> io::Result<String> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| invalid_data("expected a data URL"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| invalid_data("data URL has no payload separator"))?;

    if header.ends_with(";base64") {
        STANDARD
            .decode(payload)
            .map_err(|e| invalid_data(format!("data URL payload is not base64: {}", e)))?;
        Ok(payload.to_string())
    } else {
        let bytes = urlencoding::decode_binary(payload.as_bytes());
        Ok(STANDARD.encode(bytes))
    }
}

fn invalid_data<E>(error: E) -> io::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    io::Error::new(io::ErrorKind::InvalidData, error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct FailingSource;

    #[async_trait]
    impl FileSource for FailingSource {
        fn name(&self) -> &str {
            "broken.bin"
        }

        fn media_type(&self) -> &str {
            DEFAULT_MEDIA_TYPE
        }

        async fn read(&self) -> io::Result<FileContents> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }
    }

    #[tokio::test]
    async fn test_encode_round_trips_bytes() -> anyhow::Result<()> {
        let samples: Vec<Vec<u8>> = vec![
            vec![],
            vec![0],
            b"hello world".to_vec(),
            (0..=255u8).collect(),
            vec![0xff; 1025],
        ];

        for bytes in samples {
            let file = AttachedFile::from_bytes("f.bin", DEFAULT_MEDIA_TYPE, bytes.clone());
            let encoded = encode_file(&file).await?;
            assert_eq!(STANDARD.decode(&encoded)?, bytes);
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_encode_reads_path() -> anyhow::Result<()> {
        let mut tmp = tempfile::NamedTempFile::new()?;
        tmp.write_all(b"\x89PNG\r\n\x1a\n")?;

        let file = AttachedFile::from_path(tmp.path(), "image/png");
        assert_eq!(
            file.name(),
            tmp.path().file_name().unwrap().to_string_lossy()
        );
        assert_eq!(encode_file(&file).await?, "iVBORw0KGgo=");
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_path_is_file_read_error() {
        let file = AttachedFile::from_path("/definitely/not/here.txt", "text/plain");
        let err = encode_file(&file).await.unwrap_err();
        match err {
            WorkflowError::FileRead { name, source } => {
                assert_eq!(name, "here.txt");
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("Expected FileRead error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_read_failure_propagates_cause() {
        let err = encode_file(&FailingSource).await.unwrap_err();
        match err {
            WorkflowError::FileRead { name, source } => {
                assert_eq!(name, "broken.bin");
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("Expected FileRead error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_data_url_prefix_is_stripped() -> anyhow::Result<()> {
        let file = AttachedFile::from_data_url("hi.txt", "data:text/plain;base64,aGVsbG8=");
        assert_eq!(file.media_type(), "text/plain");
        assert_eq!(encode_file(&file).await?, "aGVsbG8=");
        Ok(())
    }

    #[tokio::test]
    async fn test_percent_encoded_data_url_is_reencoded() -> anyhow::Result<()> {
        let file = AttachedFile::from_data_url("hi.txt", "data:,hello%20world");
        assert_eq!(file.media_type(), DEFAULT_MEDIA_TYPE);
        let encoded = encode_file(&file).await?;
        assert_eq!(STANDARD.decode(encoded)?, b"hello world");
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_data_url_is_invalid_data() {
        for url in ["data:text/plain;base64", "text/plain,abc", "data:;base64,@@@"] {
            let file = AttachedFile::from_data_url("bad", url);
            match encode_file(&file).await {
                Err(WorkflowError::FileRead { source, .. }) => {
                    assert_eq!(source.kind(), io::ErrorKind::InvalidData, "url: {}", url)
                }
                other => panic!("Expected InvalidData for {}, got {:?}", url, other),
            }
        }
    }

    #[tokio::test]
    async fn test_boxed_sources_are_accepted() -> anyhow::Result<()> {
        let file: Box<dyn FileSource> =
            Box::new(AttachedFile::from_bytes("a", "text/plain", b"abc".to_vec()));
        assert_eq!(encode_file(&file).await?, "YWJj");
        Ok(())
    }
}
