use crate::config::{StitchConfig, STITCHED_FILE_NAME};
use crate::error::{Result, StitchError};
use crate::scanner::{Fragment, FragmentScanner};
use std::fs::File;
use std::io::{BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct AppendedFragment {
    pub relative_path: PathBuf,
    pub bytes: u64,
}

#[derive(Debug, Clone)]
pub struct StitchProgress {
    pub output_file: PathBuf,
    pub appended: Vec<AppendedFragment>,
    pub bytes_appended: u64,
    pub start_time: Instant,
}

impl StitchProgress {
    pub fn new(output_file: PathBuf) -> Self {
        Self {
            output_file,
            appended: Vec::new(),
            bytes_appended: 0,
            start_time: Instant::now(),
        }
    }

    pub fn record(&mut self, relative_path: PathBuf, bytes: u64) {
        self.bytes_appended += bytes;
        self.appended.push(AppendedFragment {
            relative_path,
            bytes,
        });
    }

    pub fn fragments_appended(&self) -> usize {
        self.appended.len()
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Concatenates every fragment below a root into `<root>/stitched.csv`.
pub struct FileStitcher {
    scanner: FragmentScanner,
    buffer_size: usize,
}

impl FileStitcher {
    pub fn new(config: &StitchConfig) -> Self {
        Self {
            scanner: FragmentScanner::new(config),
            buffer_size: 64 * 1024,
        }
    }

    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(4096);
        self
    }

    pub fn output_path(root: &Path) -> PathBuf {
        root.join(STITCHED_FILE_NAME)
    }

    /// Truncates the output, then appends each fragment's bytes in traversal order.
    ///
    /// `on_append` runs before each fragment is read. The first failure aborts the
    /// run; whatever was appended up to that point stays in the output file.
    pub fn stitch(
        &self,
        root: &Path,
        on_append: Option<&dyn Fn(&Fragment, &StitchProgress)>,
    ) -> Result<StitchProgress> {
        let output_path = Self::output_path(root);

        let output_file = File::create(&output_path).map_err(|source| StitchError::OutputOpen {
            path: output_path.clone(),
            source,
        })?;
        let mut writer = BufWriter::with_capacity(self.buffer_size, output_file);
        let mut progress = StitchProgress::new(output_path.clone());

        for fragment in self.scanner.fragments(root) {
            let fragment = fragment?;

            if let Some(callback) = on_append {
                callback(&fragment, &progress);
            }

            let bytes = append_fragment(&fragment, &mut writer, &output_path)?;
            progress.record(fragment.relative_path, bytes);
        }

        writer.flush().map_err(|source| StitchError::OutputWrite {
            path: output_path.clone(),
            source,
        })?;

        Ok(progress)
    }
}

fn append_fragment<W: Write>(fragment: &Fragment, writer: &mut W, output_path: &Path) -> Result<u64> {
    let read_error = |source: std::io::Error| StitchError::FragmentRead {
        path: fragment.source_path.clone(),
        source,
    };

    let mut source = File::open(&fragment.source_path).map_err(read_error)?;
    let mut buffer = vec![0u8; 8192];
    let mut total_bytes = 0u64;

    loop {
        let bytes_read = match source.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(read_error(e)),
        };

        writer
            .write_all(&buffer[..bytes_read])
            .map_err(|source| StitchError::OutputWrite {
                path: output_path.to_path_buf(),
                source,
            })?;

        total_bytes += bytes_read as u64;
    }

    Ok(total_bytes)
}
