//! Registry download with a local file cache.
//!
//! The cache is authoritative whenever the network cannot prove it stale:
//! missing `Last-Modified`, HEAD failures, and GET failures all fall back to
//! the cached copy. Only "no network and no cache" is fatal.
use crate::error::SyncError;
use crate::staging;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of raw registry text.
pub trait RegistryFetcher {
    fn fetch(&self, url: &str, cache_path: &Path) -> Result<String, SyncError>;
}

/// Blocking HTTP fetcher backed by `ureq`.
pub struct HttpFetcher {
    agent: ureq::Agent,
    offline: bool,
}

impl HttpFetcher {
    pub fn new(offline: bool) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(HTTP_TIMEOUT))
            .build()
            .into();
        Self { agent, offline }
    }

    fn remote_last_modified(&self, url: &str) -> Result<Option<DateTime<Utc>>, String> {
        let response = self
            .agent
            .head(url)
            .call()
            .map_err(|err| format!("HEAD {url}: {err}"))?;
        let Some(value) = response.headers().get("last-modified") else {
            return Ok(None);
        };
        let value = value
            .to_str()
            .map_err(|err| format!("Last-Modified header of {url}: {err}"))?;
        match parse_last_modified(value) {
            Some(stamp) => Ok(Some(stamp)),
            None => {
                tracing::warn!(url, value, "unparsable Last-Modified header; trusting cache");
                Ok(None)
            }
        }
    }

    fn download(&self, url: &str) -> Result<String, String> {
        let mut response = self
            .agent
            .get(url)
            .call()
            .map_err(|err| format!("GET {url}: {err}"))?;
        response
            .body_mut()
            .read_to_string()
            .map_err(|err| format!("read body of {url}: {err}"))
    }

    fn download_into_cache(&self, url: &str, cache_path: &Path) -> Result<String, String> {
        let text = self.download(url)?;
        tracing::info!(url, cache = %cache_path.display(), bytes = text.len(), "downloaded registry");
        if let Err(err) = staging::publish_text(cache_path, &text) {
            tracing::warn!(cache = %cache_path.display(), error = %err, "could not refresh cache");
        }
        Ok(text)
    }
}

impl RegistryFetcher for HttpFetcher {
    fn fetch(&self, url: &str, cache_path: &Path) -> Result<String, SyncError> {
        if self.offline {
            tracing::info!(url, cache = %cache_path.display(), "offline; reading cache");
            return read_cache(url, cache_path, "offline mode");
        }

        let cached_at = fs::metadata(cache_path).and_then(|meta| meta.modified()).ok();
        let Some(cached_at) = cached_at else {
            return self
                .download_into_cache(url, cache_path)
                .map_err(|detail| SyncError::Fetch {
                    url: url.to_string(),
                    cache_path: cache_path.to_path_buf(),
                    detail,
                });
        };

        let remote = match self.remote_last_modified(url) {
            Ok(remote) => remote,
            Err(detail) => {
                tracing::warn!(url, error = %detail, "registry check failed; using cache");
                return read_cache(url, cache_path, &detail);
            }
        };
        if cache_is_current(remote, cached_at) {
            tracing::info!(url, cache = %cache_path.display(), "cache is current");
            return read_cache(url, cache_path, "cache is current");
        }
        match self.download_into_cache(url, cache_path) {
            Ok(text) => Ok(text),
            Err(detail) => {
                tracing::warn!(url, error = %detail, "download failed; using stale cache");
                read_cache(url, cache_path, &detail)
            }
        }
    }
}

fn read_cache(url: &str, cache_path: &Path, reason: &str) -> Result<String, SyncError> {
    fs::read_to_string(cache_path).map_err(|err| SyncError::Fetch {
        url: url.to_string(),
        cache_path: cache_path.to_path_buf(),
        detail: format!("{reason}; cache unreadable: {err}"),
    })
}

/// Parse an HTTP-date such as `Wed, 21 Oct 2015 07:28:00 GMT`.
pub fn parse_last_modified(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|stamp| stamp.with_timezone(&Utc))
}

/// A cache is current unless the server reports a strictly newer modification.
pub fn cache_is_current(remote: Option<DateTime<Utc>>, cached_at: SystemTime) -> bool {
    match remote {
        Some(remote) => remote <= DateTime::<Utc>::from(cached_at),
        None => true,
    }
}

/// Cache file for `url`: its last path segment inside `cache_dir`.
pub fn cache_path_for(cache_dir: &Path, url: &str) -> PathBuf {
    let path = url
        .split(|ch: char| ch == '?' || ch == '#')
        .next()
        .unwrap_or(url);
    let name = path.rsplit('/').next().unwrap_or_default();
    if name.is_empty() {
        cache_dir.join("registry.csv")
    } else {
        cache_dir.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_path_uses_url_basename() {
        let dir = Path::new("/cache");
        assert_eq!(
            cache_path_for(dir, "https://www.iana.org/assignments/cbor-tags/tags.csv"),
            PathBuf::from("/cache/tags.csv")
        );
        assert_eq!(
            cache_path_for(dir, "https://host/simple.csv?x=1#frag"),
            PathBuf::from("/cache/simple.csv")
        );
        assert_eq!(
            cache_path_for(dir, "https://host/dir/"),
            PathBuf::from("/cache/registry.csv")
        );
    }

    #[test]
    fn http_dates_parse() {
        let stamp = parse_last_modified("Wed, 21 Oct 2015 07:28:00 GMT").expect("parse");
        assert_eq!(stamp.to_rfc3339(), "2015-10-21T07:28:00+00:00");
        assert_eq!(parse_last_modified("yesterday"), None);
    }

    #[test]
    fn only_strictly_newer_remote_invalidates_cache() {
        let cached_at = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000);
        let same = DateTime::<Utc>::from(cached_at);
        assert!(cache_is_current(None, cached_at));
        assert!(cache_is_current(Some(same), cached_at));
        let later = DateTime::<Utc>::from(cached_at + Duration::from_secs(1));
        assert!(!cache_is_current(Some(later), cached_at));
    }

    #[test]
    fn offline_reads_cache() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = dir.path().join("tags.csv");
        fs::write(&cache, "Tag,Data Item,Semantics,Reference,Template\n").expect("seed cache");
        let fetcher = HttpFetcher::new(true);
        let text = fetcher
            .fetch("https://invalid.test/tags.csv", &cache)
            .expect("cached text");
        assert!(text.starts_with("Tag,"));
    }

    #[test]
    fn offline_without_cache_is_a_fetch_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = dir.path().join("missing.csv");
        let err = HttpFetcher::new(true)
            .fetch("https://invalid.test/missing.csv", &cache)
            .expect_err("no cache");
        assert!(matches!(err, SyncError::Fetch { .. }));
    }

    // Port 1 on loopback refuses connections, so every request fails fast.
    const UNREACHABLE_URL: &str = "http://127.0.0.1:1/tags.csv";

    #[test]
    fn network_failure_falls_back_to_cache() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = dir.path().join("tags.csv");
        fs::write(&cache, "cached").expect("seed cache");
        let text = HttpFetcher::new(false)
            .fetch(UNREACHABLE_URL, &cache)
            .expect("cached text");
        assert_eq!(text, "cached");
    }

    #[test]
    fn network_failure_without_cache_is_a_fetch_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = dir.path().join("tags.csv");
        let err = HttpFetcher::new(false)
            .fetch(UNREACHABLE_URL, &cache)
            .expect_err("no cache");
        assert!(matches!(err, SyncError::Fetch { .. }), "unexpected {err:?}");
        assert!(!cache.exists());
    }
}
