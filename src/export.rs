//! Bulk export of final `(vertex_id, label)` pairs.
//!
//! The engine hands results to a [`VertexWriter`] one row per vertex, in vertex
//! id order. Writers decide how a row is laid out.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bsp::BspResult;
use crate::config::WRITE_BUFFER_SIZE;
use crate::error::LpError;
use crate::types::graph_serialize::{ByteEncodable, VertexId};
use crate::types::Label;

/// Row-oriented sink for final vertex values.
pub trait VertexWriter {
    fn write_vertex(&mut self, vertex_id: u64, label: Label) -> Result<(), LpError>;

    /// Flushes buffered rows. Called once after the last row.
    fn finish(&mut self) -> Result<(), LpError> {
        Ok(())
    }
}

/// Streams every `(vertex_id, label)` pair of `result` into `writer` and returns
/// the number of written rows.
pub fn export(result: &BspResult<Label>, writer: &mut dyn VertexWriter) -> Result<u64, LpError> {
    for &(vertex_id, label) in &result.values {
        writer.write_vertex(vertex_id, label)?;
    }
    writer.finish()?;
    debug!(rows = result.values.len(), "exported vertex labels");
    Ok(result.values.len() as u64)
}

/// Keeps rows in memory.
#[derive(Debug, Default)]
pub struct MemoryWriter {
    pub rows: Vec<(u64, Label)>,
}

impl VertexWriter for MemoryWriter {
    fn write_vertex(&mut self, vertex_id: u64, label: Label) -> Result<(), LpError> {
        self.rows.push((vertex_id, label));
        Ok(())
    }
}

/// Writes one `v <vertex_id> <label>` line per vertex.
pub struct TextWriter<W: Write> {
    inner: W,
}

impl<W: Write> TextWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl TextWriter<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, LpError> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::with_capacity(WRITE_BUFFER_SIZE, file)))
    }
}

impl<W: Write> VertexWriter for TextWriter<W> {
    fn write_vertex(&mut self, vertex_id: u64, label: Label) -> Result<(), LpError> {
        writeln!(self.inner, "v {} {}", vertex_id, label)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), LpError> {
        self.inner.flush()?;
        Ok(())
    }
}

/// Writes fixed-width binary rows: the row key (vertex id) followed by the
/// label column, both little-endian. Rows carry no edge column; the topology
/// stays in the graph store.
pub struct RowWriter<W: Write> {
    inner: W,
}

impl<W: Write> RowWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Width of one encoded row.
    pub fn row_size() -> usize {
        u64::byte_size() + Label::byte_size()
    }
}

impl RowWriter<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, LpError> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::with_capacity(WRITE_BUFFER_SIZE, file)))
    }
}

/// Row key of a vertex.
pub fn row_key<T: VertexId>(vertex_id: &T) -> Vec<u8> {
    vertex_id.to_bytes()
}

impl<W: Write> VertexWriter for RowWriter<W> {
    fn write_vertex(&mut self, vertex_id: u64, label: Label) -> Result<(), LpError> {
        self.inner.write_all(&row_key(&vertex_id))?;
        self.inner.write_all(&label.to_bytes())?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), LpError> {
        self.inner.flush()?;
        Ok(())
    }
}

/// Decodes rows written by [`RowWriter`]. A trailing partial row is ignored.
pub fn read_rows(mut reader: impl Read) -> Result<Vec<(u64, Label)>, LpError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    let key_size = u64::byte_size();
    Ok(bytes
        .chunks_exact(RowWriter::<Vec<u8>>::row_size())
        .filter_map(|row| Some((u64::from_bytes(row)?, Label::from_bytes(&row[key_size..])?)))
        .collect())
}

/// Whole-result snapshot, serialized with bincode.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct LabelSnapshot {
    pub supersteps: u64,
    pub labels: Vec<(u64, Label)>,
}

impl LabelSnapshot {
    pub fn from_result(result: &BspResult<Label>) -> Self {
        Self {
            supersteps: result.supersteps,
            labels: result.values.clone(),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LpError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);
        bincode::serialize_into(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LpError> {
        let file = File::open(path)?;
        Ok(bincode::deserialize_from(file)?)
    }
}

/// Collects rows and writes a [`LabelSnapshot`] on [`VertexWriter::finish`].
pub struct SnapshotWriter {
    path: std::path::PathBuf,
    snapshot: LabelSnapshot,
}

impl SnapshotWriter {
    pub fn new(path: impl AsRef<Path>, supersteps: u64) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            snapshot: LabelSnapshot {
                supersteps,
                labels: Vec::new(),
            },
        }
    }
}

impl VertexWriter for SnapshotWriter {
    fn write_vertex(&mut self, vertex_id: u64, label: Label) -> Result<(), LpError> {
        self.snapshot.labels.push((vertex_id, label));
        Ok(())
    }

    fn finish(&mut self) -> Result<(), LpError> {
        self.snapshot.save(&self.path)
    }
}
