use std::{fs::File, io::Write, path::{Path, PathBuf}, time::Duration};

use anyhow::{Context, Result, bail};
use reqwest::blocking::Client;
use tempfile::NamedTempFile;

const USER_AGENT: &str = concat!("lakecrop/", env!("CARGO_PKG_VERSION"));

/// Write-then-rename wrapper for atomic big-file outputs
struct PendingWrite {
    target: PathBuf,
    tmp: Option<(NamedTempFile, bool)>, // (file, need_fsync_dir)
}

impl PendingWrite {
    /// Open a file for a big write.
    fn open(target: &Path, force: bool) -> Result<Self> {
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir {}", parent.display()))?;
        }
        if !force && target.exists() {
            bail!("Refusing to overwrite existing file: {}", target.display());
        }
        let need_fsync_dir = target.parent().is_some();
        let tmp = NamedTempFile::new_in(target.parent().unwrap_or(Path::new(".")))
            .context("create temp file")?;

        Ok(Self { target: target.to_path_buf(), tmp: Some((tmp, need_fsync_dir)) })
    }

    fn file(&mut self) -> std::io::Result<&mut NamedTempFile> {
        self.tmp.as_mut()
            .map(|(file, _)| file)
            .ok_or_else(|| std::io::Error::other("write after finalize"))
    }

    /// Finalize the big write.
    fn finalize(&mut self) -> Result<()> {
        let Some((tmp, need_fsync_dir)) = self.tmp.take() else {
            bail!("{} was already finalized", self.target.display());
        };
        tmp.as_file().sync_all().ok(); // best-effort fsync file
        tmp.persist(&self.target)
            .with_context(|| format!("rename to {}", self.target.display()))?;
        if need_fsync_dir {
            if let Some(dir) = self.target.parent() {
                let _ = File::open(dir).and_then(|f| f.sync_all());
            }
        }
        Ok(())
    }
}

impl Write for PendingWrite {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.file()?.write(buf)
    }
    fn flush(&mut self) -> std::io::Result<()> {
        self.file()?.flush()
    }
}

fn client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(300))
        .build()
        .context("build HTTP client")
}

/// Download a large file from `file_url` to `out_path`.
pub(crate) fn download_big_file(file_url: &str, out_path: &Path, force: bool) -> Result<()> {
    // Safe big-file write (tempfile -> atomic rename), no accidental overwrite unless forced
    let mut sink = PendingWrite::open(out_path, force)?;

    let mut resp = client()?
        .get(file_url)
        .send()
        .with_context(|| format!("GET {file_url}"))?
        .error_for_status()
        .with_context(|| format!("GET {file_url} returned error status"))?;

    std::io::copy(&mut resp, &mut sink).with_context(|| format!("write {}", out_path.display()))?;

    sink.finalize()?;
    Ok(())
}

/// Fetch a remote resource fully into memory.
pub(crate) fn fetch_bytes(url: &str) -> Result<Vec<u8>> {
    let resp = client()?
        .get(url)
        .send()
        .with_context(|| format!("GET {url}"))?
        .error_for_status()
        .with_context(|| format!("GET {url} returned error status"))?;

    Ok(resp.bytes().with_context(|| format!("read body of {url}"))?.to_vec())
}
