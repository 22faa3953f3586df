//! HTTP 전송 추상화
//!
//! [`ArchiveFetcher`] 트레잇 덕분에 엔진은 운영에서는 [`HttpFetcher`]를,
//! 테스트에서는 메모리 내 모의 구현을 사용합니다.
//!
//! 본문은 `<destination>.part`로 스트리밍하고 마지막 청크를 flush한 뒤에만
//! 제자리로 rename합니다. 저장 경로에는 완전한 본문이 있거나 아무것도 없습니다.

use std::future::Future;
use std::path::{Path, PathBuf};

use futures::StreamExt;
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::config::DownloaderConfig;
use crate::error::DownloaderError;

/// URL 하나를 로컬 파일 하나로 가져오는 트레잇
pub trait ArchiveFetcher: Send + Sync + 'static {
    /// `url`을 `destination`에 내려받고 기록한 바이트 수를 반환합니다.
    ///
    /// # Errors
    ///
    /// - `DownloaderError::Http`: 2xx가 아닌 응답
    /// - `DownloaderError::Transport`: 연결 또는 본문 스트림 실패
    /// - `DownloaderError::Io`: 로컬 쓰기 실패
    fn fetch(
        &self,
        url: &str,
        destination: &Path,
    ) -> impl Future<Output = Result<u64, DownloaderError>> + Send;
}

/// 연결 풀을 쓰는 reqwest 기반 fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// 설정된 타임아웃과 user agent로 클라이언트를 생성합니다.
    ///
    /// # Errors
    ///
    /// TLS 백엔드나 클라이언트 초기화 실패 시 `DownloaderError::ClientBuild` 반환
    pub fn new(config: &DownloaderConfig) -> Result<Self, DownloaderError> {
        let mut builder = Client::builder().user_agent(&config.user_agent);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = config.connect_timeout() {
            builder = builder.connect_timeout(connect_timeout);
        }
        let client = builder
            .build()
            .map_err(|e| DownloaderError::ClientBuild(e.to_string()))?;
        Ok(Self { client })
    }

    /// 기존 클라이언트를 감쌉니다.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn stream_to(
        &self,
        url: &str,
        part_path: &Path,
    ) -> Result<u64, DownloaderError> {
        let transport = |e: reqwest::Error| DownloaderError::Transport {
            url: url.to_owned(),
            reason: e.to_string(),
        };
        let io = |source: std::io::Error| DownloaderError::Io {
            path: part_path.display().to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloaderError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }

        let mut file = tokio::fs::File::create(part_path).await.map_err(io)?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(transport)?;
            file.write_all(&chunk).await.map_err(io)?;
            written += chunk.len() as u64;
        }

        file.flush().await.map_err(io)?;
        file.sync_all().await.map_err(io)?;
        Ok(written)
    }
}

impl ArchiveFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, destination: &Path) -> Result<u64, DownloaderError> {
        let part_path = part_path(destination);

        let written = match self.stream_to(url, &part_path).await {
            Ok(written) => written,
            Err(e) => {
                // part 파일이 아직 없을 수 있음
                let _ = tokio::fs::remove_file(&part_path).await;
                return Err(e);
            }
        };

        if let Err(source) = tokio::fs::rename(&part_path, destination).await {
            let _ = tokio::fs::remove_file(&part_path).await;
            return Err(DownloaderError::Io {
                path: destination.display().to_string(),
                source,
            });
        }

        debug!(url, path = %destination.display(), bytes = written, "body written");
        Ok(written)
    }
}

/// `<destination>.part` 경로를 반환합니다.
pub(crate) fn part_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn part_path_appends_suffix() {
        assert_eq!(
            part_path(Path::new("/out/glibc-2.41.tar.gz")),
            PathBuf::from("/out/glibc-2.41.tar.gz.part")
        );
    }

    #[test]
    fn client_builds_with_default_config() {
        HttpFetcher::new(&DownloaderConfig::default()).unwrap();
    }

    #[test]
    fn client_builds_without_timeouts() {
        let config = DownloaderConfig {
            timeout_secs: 0,
            connect_timeout_secs: 0,
            ..Default::default()
        };
        HttpFetcher::new(&config).unwrap();
    }
}
