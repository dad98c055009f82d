use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::Path,
};

use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::{
    models::state::DownloadOutcome,
    remote::retry::RetryPolicy,
    utils::errors::{StateInfoError, StateResult},
};

/// Moves the bytes behind a URL into a writer.
pub trait FileTransport {
    fn fetch(&self, url: &str, out: &mut dyn Write) -> StateResult<()>;
}

/// Plain HTTP GET. Statefile URLs are pre-signed so no credentials are sent.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> StateResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| StateInfoError::config(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl FileTransport for HttpTransport {
    fn fetch(&self, url: &str, out: &mut dyn Write) -> StateResult<()> {
        let download_err = |e: reqwest::Error| StateInfoError::Download {
            url: url.to_owned(),
            transient: e.is_timeout()
                || e.is_connect()
                || e.status().is_some_and(|s| s.is_server_error()),
            message: e.to_string(),
        };

        let mut resp = self
            .client
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .map_err(download_err)?;
        resp.copy_to(out).map_err(download_err)?;
        Ok(())
    }
}

pub struct Downloader<T: FileTransport> {
    transport: T,
    retry: RetryPolicy,
}

impl<T: FileTransport> Downloader<T> {
    pub fn new(transport: T, retry: RetryPolicy) -> Self {
        Self { transport, retry }
    }

    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Writes the body behind `url` to `dest`, replacing any existing file,
    /// and measures the file that ended up on disk.
    pub fn download(&self, url: &str, dest: &Path) -> StateResult<DownloadOutcome> {
        self.retry
            .run(&format!("Downloading {}", dest.display()), || {
                self.write_to(url, dest)
            })?;

        let size = fs::metadata(dest)
            .map_err(|e| StateInfoError::fs(dest, e))?
            .len();
        info!("Downloaded to {}", dest.display());

        Ok(DownloadOutcome {
            path: dest.to_path_buf(),
            size,
            retained: true,
        })
    }

    pub fn remove(&self, outcome: DownloadOutcome) -> StateResult<DownloadOutcome> {
        fs::remove_file(&outcome.path).map_err(|e| StateInfoError::fs(&outcome.path, e))?;
        debug!("Removed {}", outcome.path.display());

        Ok(DownloadOutcome {
            retained: false,
            ..outcome
        })
    }

    fn write_to(&self, url: &str, dest: &Path) -> StateResult<()> {
        let file = File::create(dest).map_err(|e| StateInfoError::fs(dest, e))?;
        match self.fetch_into(url, dest, BufWriter::new(file)) {
            Ok(writer) => writer
                .into_inner()
                .map_err(|e| StateInfoError::fs(dest, e.into_error()))?
                .sync_all()
                .map_err(|e| StateInfoError::fs(dest, e)),
            Err(e) => {
                // A partial body is never measured.
                let _ = fs::remove_file(dest);
                Err(e)
            }
        }
    }

    /// Runs the transport into `out`. A failure of `out` itself is reported
    /// against `dest` rather than as a network error.
    fn fetch_into<W: Write>(&self, url: &str, dest: &Path, out: W) -> StateResult<W> {
        let mut writer = RecordingWriter::new(out);
        match self.transport.fetch(url, &mut writer) {
            Ok(()) => Ok(writer.inner),
            Err(e) => Err(match writer.failure.take() {
                Some(io_err) => StateInfoError::fs(dest, io_err),
                None => e,
            }),
        }
    }
}

/// Keeps the first error raised by the wrapped writer.
struct RecordingWriter<W> {
    inner: W,
    failure: Option<io::Error>,
}

impl<W: Write> RecordingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            failure: None,
        }
    }

    fn record<T>(&mut self, res: io::Result<T>) -> io::Result<T> {
        if let Err(e) = &res
            && self.failure.is_none()
        {
            self.failure = Some(io::Error::new(e.kind(), e.to_string()));
        }
        res
    }
}

impl<W: Write> Write for RecordingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let res = self.inner.write(buf);
        self.record(res)
    }

    fn flush(&mut self) -> io::Result<()> {
        let res = self.inner.flush();
        self.record(res)
    }
}
