// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Temporary store: a compressed, write-once / read-once scratch stream.
//
// `create_temporary` hands out the writing half. Finishing it yields the
// reading half; the scratch space is released when the reader is dropped.
// Data is deflate-compressed (`flate2`) on its way in, over either an
// anonymous temporary file (`tempfile`) or an in-memory buffer.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Cursor, Read, Seek, SeekFrom, Write};

use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use rasterwerk_core::config::{EngineConfig, ScratchBacking};
use rasterwerk_core::error::{RasterError, Result};
use tracing::{debug, instrument};

enum Sink {
    File(BufWriter<File>),
    Memory(Vec<u8>),
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::File(file) => file.write(buf),
            Self::Memory(bytes) => bytes.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::File(file) => file.flush(),
            Self::Memory(_) => Ok(()),
        }
    }
}

enum Source {
    File(BufReader<File>),
    Memory(Cursor<Vec<u8>>),
}

impl Read for Source {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::File(file) => file.read(buf),
            Self::Memory(bytes) => bytes.read(buf),
        }
    }
}

/// Writing half of a temporary store.
pub struct TempWriter {
    encoder: DeflateEncoder<Sink>,
    bytes_in: u64,
}

/// Reading half of a temporary store. Forward-only; dropping it releases
/// the scratch space.
pub struct TempReader {
    decoder: DeflateDecoder<Source>,
    bytes_in: u64,
    compressed_len: u64,
}

impl std::fmt::Debug for TempWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TempWriter")
            .field("bytes_in", &self.bytes_in)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for TempReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TempReader")
            .field("bytes_in", &self.bytes_in)
            .field("compressed_len", &self.compressed_len)
            .finish_non_exhaustive()
    }
}

/// Open a new temporary store using the configured backing.
#[instrument(skip_all, fields(backing = ?config.scratch_backing))]
pub fn create_temporary(config: &EngineConfig) -> Result<TempWriter> {
    let sink = match config.scratch_backing {
        ScratchBacking::File => {
            let file = match &config.scratch_dir {
                Some(dir) => tempfile::tempfile_in(dir),
                None => tempfile::tempfile(),
            }
            .map_err(scratch_error)?;
            Sink::File(BufWriter::new(file))
        }
        ScratchBacking::Memory => Sink::Memory(Vec::new()),
    };
    let level = Compression::new(config.scratch_compression.min(9));
    debug!(level = level.level(), "Temporary store opened");
    Ok(TempWriter {
        encoder: DeflateEncoder::new(sink, level),
        bytes_in: 0,
    })
}

impl TempWriter {
    /// Uncompressed bytes written so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_in
    }

    /// Finish compression and switch the store to reading.
    pub fn finish(self) -> Result<TempReader> {
        let bytes_in = self.bytes_in;
        let sink = self.encoder.finish().map_err(scratch_error)?;
        let (source, compressed_len) = match sink {
            Sink::File(writer) => {
                let mut file = writer
                    .into_inner()
                    .map_err(|err| scratch_error(err.into_error()))?;
                let compressed_len = file.stream_position().map_err(scratch_error)?;
                file.seek(SeekFrom::Start(0)).map_err(scratch_error)?;
                (Source::File(BufReader::new(file)), compressed_len)
            }
            Sink::Memory(bytes) => {
                let compressed_len = bytes.len() as u64;
                (Source::Memory(Cursor::new(bytes)), compressed_len)
            }
        };
        debug!(bytes_in, compressed_len, "Temporary store sealed");
        Ok(TempReader {
            decoder: DeflateDecoder::new(source),
            bytes_in,
            compressed_len,
        })
    }
}

impl Write for TempWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.encoder.write(buf)?;
        self.bytes_in += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.encoder.flush()
    }
}

impl TempReader {
    /// Uncompressed size of the stored data.
    pub fn len(&self) -> u64 {
        self.bytes_in
    }

    pub fn is_empty(&self) -> bool {
        self.bytes_in == 0
    }

    /// Size of the stored data after compression.
    pub fn compressed_len(&self) -> u64 {
        self.compressed_len
    }
}

impl Read for TempReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.decoder.read(buf)
    }
}

pub(crate) fn scratch_error(err: io::Error) -> RasterError {
    RasterError::Scratch(err.to_string())
}
