//! Binary encoding of index generations.
//!
//! Layout (little-endian, varints are LEB128):
//!
//! ```text
//! magic        8 bytes  "LOUPEIDX"
//! version      u32
//! generation   u64
//! built_at     i64
//! doc_count    varint
//! documents    doc_count × { url: string, title: string, time: zigzag varint }
//! field_count  varint
//! fields       field_count × {
//!                name: string, term_count: varint,
//!                terms: term_count × {
//!                  text: string, posting_count: varint,
//!                  postings: posting_count × {
//!                    doc_delta: varint, positions: delta sequence
//!                  }
//!                }
//!              }
//! checksum     u32 CRC32 of everything above
//! ```
//!
//! Fields and terms are written in sorted order, so encoding the same
//! generation twice yields identical bytes.

use std::collections::BTreeMap;

use crate::document::Document;
use crate::error::{LoupeError, Result};
use crate::index::generation::{DocId, FieldPostings, IndexGeneration, Posting, PostingList};
use crate::storage::structured::{StructReader, StructWriter};

/// File magic.
pub const MAGIC: &[u8; 8] = b"LOUPEIDX";

/// Current format version.
pub const FORMAT_VERSION: u32 = 1;

/// Serialize a generation.
pub fn encode(generation: &IndexGeneration) -> Result<Vec<u8>> {
    let mut writer = StructWriter::with_capacity(estimate_size(generation));

    writer.write_raw(MAGIC)?;
    writer.write_u32(FORMAT_VERSION)?;
    writer.write_u64(generation.id())?;
    writer.write_i64(generation.built_at())?;

    writer.write_varint(generation.doc_count() as u64)?;
    for doc in generation.documents() {
        writer.write_string(&doc.url)?;
        writer.write_string(&doc.title)?;
        writer.write_signed_varint(doc.time)?;
    }

    let fields = generation.field_postings();
    writer.write_varint(fields.len() as u64)?;
    for (field, terms) in fields {
        writer.write_string(field)?;
        writer.write_varint(terms.len() as u64)?;
        for (text, list) in terms {
            writer.write_string(text)?;
            write_postings(&mut writer, list)?;
        }
    }

    Ok(writer.finish())
}

/// Deserialize and validate a generation.
pub fn decode(bytes: &[u8]) -> Result<IndexGeneration> {
    let mut reader = StructReader::new(bytes)?;

    let magic = reader.read_raw(MAGIC.len())?;
    if magic != MAGIC {
        return Err(LoupeError::corrupted("bad magic"));
    }
    let version = reader.read_u32()?;
    if version != FORMAT_VERSION {
        return Err(LoupeError::corrupted(format!(
            "unsupported format version {version}"
        )));
    }
    let id = reader.read_u64()?;
    let built_at = reader.read_i64()?;

    let doc_count = reader.read_len("document count")?;
    let mut documents = Vec::with_capacity(doc_count);
    for _ in 0..doc_count {
        let url = reader.read_string()?;
        let title = reader.read_string()?;
        let time = reader.read_signed_varint()?;
        documents.push(Document { url, title, time });
    }

    let field_count = reader.read_len("field count")?;
    let mut postings = FieldPostings::new();
    for _ in 0..field_count {
        let field = reader.read_string()?;
        let term_count = reader.read_len("term count")?;
        let mut terms = BTreeMap::new();
        for _ in 0..term_count {
            let text = reader.read_string()?;
            let list = read_postings(&mut reader)?;
            if terms.insert(text, list).is_some() {
                return Err(LoupeError::corrupted(format!(
                    "duplicate term in field {field}"
                )));
            }
        }
        postings.insert(field, terms);
    }

    if !reader.is_eof() {
        return Err(LoupeError::corrupted(format!(
            "{} trailing bytes",
            reader.remaining()
        )));
    }

    let generation = IndexGeneration::new(id, built_at, postings, documents);
    generation
        .validate()
        .map_err(|e| LoupeError::corrupted(e.to_string()))?;
    Ok(generation)
}

fn write_postings(writer: &mut StructWriter, list: &PostingList) -> Result<()> {
    writer.write_varint(list.len() as u64)?;
    let mut previous: DocId = 0;
    for (i, posting) in list.iter().enumerate() {
        if i > 0 && posting.doc_id <= previous {
            return Err(LoupeError::internal(format!(
                "postings not sorted: doc {} after {previous}",
                posting.doc_id
            )));
        }
        writer.write_varint((posting.doc_id - previous) as u64)?;
        writer.write_delta_u32s(&posting.positions)?;
        previous = posting.doc_id;
    }
    Ok(())
}

fn read_postings(reader: &mut StructReader<'_>) -> Result<PostingList> {
    let count = reader.read_len("posting count")?;
    let mut list = Vec::with_capacity(count);
    let mut previous: u64 = 0;
    for _ in 0..count {
        let doc_id = previous + reader.read_varint()?;
        let doc_id = DocId::try_from(doc_id)
            .map_err(|_| LoupeError::corrupted(format!("doc id {doc_id} out of range")))?;
        let positions = reader.read_delta_u32s()?;
        list.push(Posting::new(doc_id, positions));
        previous = doc_id as u64;
    }
    Ok(list)
}

fn estimate_size(generation: &IndexGeneration) -> usize {
    let stored: usize = generation
        .documents()
        .iter()
        .map(|doc| doc.url.len() + doc.title.len() + 8)
        .sum();
    stored * 3 + 64
}
