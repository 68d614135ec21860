use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// How the recovered content was found in the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotForm {
    /// `documentChunks` reassembled by offset.
    Chunked,
    /// The snapshot was a bare JSON string.
    PlainString,
    /// An object carrying the text in a `content` field.
    ContentField,
    /// Not a recognised structure; the input bytes are returned untouched.
    Raw,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovery {
    pub content: Vec<u8>,
    pub form: SnapshotForm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ChunkRange {
    pub start: u64,
}

/// One fragment of a snapshot document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct SnapshotChunk {
    #[serde(default)]
    pub range: Option<ChunkRange>,
    #[serde(default)]
    pub chunk: Option<String>,
}

impl SnapshotChunk {
    /// Lenient decoding: anything that is not a well-formed chunk object
    /// becomes a chunk with neither offset nor payload.
    fn from_value(value: Value) -> Self {
        if let Value::Object(mut map) = value {
            let range = map
                .remove("range")
                .and_then(|r| serde_json::from_value::<ChunkRange>(r).ok());
            let chunk = match map.remove("chunk") {
                Some(Value::String(text)) => Some(text),
                _ => None,
            };
            SnapshotChunk { range, chunk }
        } else {
            SnapshotChunk::default()
        }
    }
}

/// Order chunks by the start of their range and concatenate the payloads.
///
/// If any chunk lacks a range the original order is kept. The sort is stable,
/// so chunks with equal starts keep their relative order.
pub fn reassemble_chunks(mut chunks: Vec<SnapshotChunk>) -> String {
    if chunks.iter().all(|c| c.range.is_some()) {
        chunks.sort_by_key(|c| c.range.map(|r| r.start));
    } else {
        debug!("Chunk without range metadata, keeping snapshot order");
    }

    chunks
        .into_iter()
        .filter_map(|c| c.chunk)
        .collect::<Vec<_>>()
        .concat()
}

/// Recover file content from a snapshot. Never fails: input that is not a
/// recognised snapshot comes back byte for byte.
pub fn recover_snapshot(raw: &[u8]) -> Recovery {
    let value: Value = match serde_json::from_slice(raw) {
        Ok(value) => value,
        Err(e) => {
            debug!("Snapshot is not JSON ({}), passing raw bytes through", e);
            return raw_passthrough(raw);
        }
    };

    match value {
        Value::String(text) => Recovery {
            content: text.into_bytes(),
            form: SnapshotForm::PlainString,
        },
        Value::Object(mut map) => {
            if let Some(Value::Array(items)) = map.remove("documentChunks") {
                let chunks = items.into_iter().map(SnapshotChunk::from_value).collect();
                return Recovery {
                    content: reassemble_chunks(chunks).into_bytes(),
                    form: SnapshotForm::Chunked,
                };
            }
            if let Some(Value::String(text)) = map.remove("content") {
                return Recovery {
                    content: text.into_bytes(),
                    form: SnapshotForm::ContentField,
                };
            }
            debug!("Snapshot object has no recognised content, passing raw bytes through");
            raw_passthrough(raw)
        }
        _ => raw_passthrough(raw),
    }
}

fn raw_passthrough(raw: &[u8]) -> Recovery {
    Recovery {
        content: raw.to_vec(),
        form: SnapshotForm::Raw,
    }
}
