// feedsniff - platform/fs.rs
//
// Reading feed bytes from disk.
//
// Two entry points: `read_prefix` for classification (the sniffer never
// looks past its window, so there is no point reading more) and
// `read_feed_bytes` for full parsing. Large files are memory-mapped instead
// of copied onto the heap. Transient I/O errors (WouldBlock, Interrupted,
// TimedOut) are retried with capped backoff; permanent errors return
// immediately.

use crate::util::constants;
use crate::util::error::InputError;
use std::io::{self, Read};
use std::ops::Deref;
use std::path::Path;
use std::time::Duration;

/// The full contents of a feed file, owned or memory-mapped.
#[derive(Debug)]
pub enum FeedBytes {
    Owned(Vec<u8>),
    Mapped(memmap2::Mmap),
}

impl Deref for FeedBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            FeedBytes::Owned(bytes) => bytes,
            FeedBytes::Mapped(map) => map,
        }
    }
}

/// Read an entire file, refusing anything over `max_size` bytes. With
/// `memory_map` set (the file was flagged large when it was discovered) the
/// contents are mapped instead of copied.
pub fn read_feed_bytes(
    path: &Path,
    max_size: u64,
    memory_map: bool,
) -> Result<FeedBytes, InputError> {
    let io_err = |source| InputError::Io {
        path: path.to_path_buf(),
        source,
    };

    let size = std::fs::metadata(path).map_err(io_err)?.len();
    if size > max_size {
        return Err(InputError::TooLarge {
            path: path.to_path_buf(),
            size,
            max: max_size,
        });
    }

    if memory_map && size > 0 {
        tracing::debug!(file = %path.display(), size, "Memory-mapping large file");
        let file = std::fs::File::open(path).map_err(io_err)?;
        // SAFETY: the map is read-only and never outlives this FeedBytes. A
        // concurrent writer truncating the file could fault the reader; feed
        // files are expected to be fully written before they are examined.
        let map = unsafe { memmap2::Mmap::map(&file) }.map_err(io_err)?;
        return Ok(FeedBytes::Mapped(map));
    }

    with_retry(path, || std::fs::read(path))
        .map(FeedBytes::Owned)
        .map_err(io_err)
}

/// Read at most `limit` bytes from the start of a file.
pub fn read_prefix(path: &Path, limit: usize) -> Result<Vec<u8>, InputError> {
    with_retry(path, || {
        let file = std::fs::File::open(path)?;
        let mut buf = Vec::with_capacity(limit.min(constants::SNIFF_WINDOW_BYTES));
        file.take(limit as u64).read_to_end(&mut buf)?;
        Ok(buf)
    })
    .map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn with_retry<T, F>(path: &Path, mut op: F) -> io::Result<T>
where
    F: FnMut() -> io::Result<T>,
{
    let mut last_err: Option<io::Error> = None;

    for attempt in 0..constants::MAX_READ_RETRIES {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if is_transient_error(&e) => {
                tracing::debug!(
                    file = %path.display(),
                    attempt = attempt + 1,
                    error = %e,
                    "Transient I/O error, retrying"
                );
                let delay = constants::READ_RETRY_DELAYS_MS[attempt as usize];
                std::thread::sleep(Duration::from_millis(delay));
                last_err = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_err.unwrap_or_else(|| io::Error::other("Unknown read error")))
}

fn is_transient_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
    )
}
