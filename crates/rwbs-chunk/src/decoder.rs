//! Recursive chunk tree decoder.

use std::path::Path;

use rwbs_common::{Buffer, DiagnosticSink, TracingSink};

use crate::header::{read_header, RawChunk};
use crate::registry::{Registry, Shape};
use crate::{Chunk, Error, Result};

/// What to do when a section projection runs past its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverrunPolicy {
    /// Fail the whole decode with [`Error::Section`].
    #[default]
    Abort,
    /// Log the failure, keep the node with an empty section and carry on.
    Isolate,
}

/// Decoder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    pub overrun: OverrunPolicy,
    /// Lists nested deeper than this are kept as opaque data.
    pub max_depth: usize,
}

impl DecodeOptions {
    pub const DEFAULT_MAX_DEPTH: usize = 64;

    pub fn overrun(mut self, policy: OverrunPolicy) -> Self {
        self.overrun = policy;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            overrun: OverrunPolicy::default(),
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

/// Decodes byte streams into [`Chunk`] trees.
///
/// Decoding is a depth-first walk over nested headers. List children are
/// read until the parent payload is exhausted, then each node is projected
/// into its typed [`Section`](crate::Section). A decoder holds no per-call
/// state and may be shared between threads decoding different inputs.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    registry: Registry,
    options: DecodeOptions,
}

impl Decoder {
    /// A decoder using the built-in registry and default options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: Registry) -> Self {
        Self {
            registry,
            options: DecodeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    #[inline]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[inline]
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    #[inline]
    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Decode the first chunk in `data`, reporting anomalies through `tracing`.
    pub fn decode(&self, data: &[u8]) -> Result<Chunk> {
        self.decode_with_sink(data, &TracingSink)
    }

    /// Decode the first chunk in `data`.
    pub fn decode_with_sink(&self, data: &[u8], sink: &dyn DiagnosticSink) -> Result<Chunk> {
        let mut source = Buffer::wrap(data);
        self.read_chunk(&mut source, sink)?
            .ok_or(Error::NoChunk { size: data.len() })
    }

    /// Decode every top-level chunk in `data`.
    pub fn decode_all(&self, data: &[u8], sink: &dyn DiagnosticSink) -> Result<Vec<Chunk>> {
        let mut source = Buffer::wrap(data);
        let mut chunks = Vec::new();
        while !source.is_empty() {
            if let Some(chunk) = self.read_chunk(&mut source, sink)? {
                chunks.push(chunk);
            }
        }
        Ok(chunks)
    }

    /// Read and decode one chunk at the cursor of `source`.
    ///
    /// Returns `Ok(None)` when no complete chunk could be read; the header
    /// parser has then consumed the rest of `source`.
    pub fn read_chunk(&self, source: &mut Buffer<'_>, sink: &dyn DiagnosticSink) -> Result<Option<Chunk>> {
        match read_header(source, sink)? {
            Some(raw) => self.decode_node(raw, 0, sink).map(Some),
            None => Ok(None),
        }
    }

    /// Read a whole file and decode its first chunk.
    pub fn decode_file(&self, path: impl AsRef<Path>) -> Result<Chunk> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        tracing::debug!(target: "rwbs", path = %path.display(), size = data.len(), "decoding file");
        self.decode(&data)
    }

    fn decode_node(&self, raw: RawChunk<'_>, depth: usize, sink: &dyn DiagnosticSink) -> Result<Chunk> {
        let RawChunk { header, mut payload } = raw;
        let loader = self.registry.resolve(&header, &payload);

        let mut chunk = match loader.shape {
            Shape::List if depth >= self.options.max_depth => {
                sink.warn(format_args!(
                    "{} nested deeper than {} levels, kept as data",
                    header.kind, self.options.max_depth
                ));
                return Ok(Chunk::data(header.kind, header.version, payload.as_slice().to_vec()));
            }
            Shape::List => {
                let mut children = Vec::new();
                while !payload.is_empty() {
                    if let Some(child) = read_header(&mut payload, sink)? {
                        children.push(self.decode_node(child, depth + 1, sink)?);
                    }
                }
                Chunk::list(header.kind, header.version, children)
            }
            Shape::Data => Chunk::data(header.kind, header.version, payload.as_slice().to_vec()),
        };

        match (loader.project)(&chunk, sink) {
            Ok(section) => chunk.set_section(section),
            Err(source) => {
                sink.error(format_args!("Failed to decode {}: {source}", header.kind));
                if self.options.overrun == OverrunPolicy::Abort {
                    return Err(Error::Section {
                        section: header.kind.name(),
                        source,
                    });
                }
            }
        }

        Ok(chunk)
    }
}
