//! Versioned wire codec. `pack` always writes the current field layout for
//! a kind; `unpack_batch` reads the header to learn the kind and version
//! and dispatches to that kind's historically-aware decoder.

mod event;
mod header;
mod job;
mod primitives;
mod reservation;
mod step;
mod suspend;

use bytes::{BufMut, BytesMut};

use crate::constants::{CURRENT_VERSION, INITIAL_BUFFER_CAPACITY};
use crate::error::ArchiveResult;
use crate::record::{RecordBatch, RecordKind};

pub use header::Header;

/// Packs a batch of same-kind records at the current protocol version into
/// a complete archive buffer: header followed by each encoded record.
pub fn pack(cluster: &str, wall_time: i64, kind: RecordKind, batch: &RecordBatch) -> BytesMut {
    let mut buf = BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY.min(64 * 1024));
    let header = Header {
        protocol_version: CURRENT_VERSION,
        wall_time,
        record_kind: kind,
        cluster_name: cluster.to_string(),
        record_count: batch.len() as u32,
    };
    header.encode(&mut buf);
    encode_batch(&mut buf, batch);
    buf
}

fn encode_batch(buf: &mut impl BufMut, batch: &RecordBatch) {
    match batch {
        RecordBatch::Event(records) => {
            for r in records {
                event::encode(r, buf);
            }
        }
        RecordBatch::Suspend(records) => {
            for r in records {
                suspend::encode(r, buf);
            }
        }
        RecordBatch::Step(records) => {
            for r in records {
                step::encode(r, buf);
            }
        }
        RecordBatch::Job(records) => {
            for r in records {
                job::encode(r, buf);
            }
        }
        RecordBatch::Reservation(records) => {
            for r in records {
                reservation::encode(r, buf);
            }
        }
    }
}

/// Reads a header and its record stream from `bytes`, returning the header
/// and the decoded batch. Accepts any version the relevant kind's codec
/// table still understands, down to that kind's oldest supported tier.
pub fn unpack_batch(mut bytes: &[u8]) -> ArchiveResult<(Header, RecordBatch)> {
    let header = Header::decode(&mut bytes)?;
    let version = header.protocol_version;
    let count = header.record_count as usize;

    let batch = match header.record_kind {
        RecordKind::Event => {
            let mut records = Vec::with_capacity(count);
            for _ in 0..count {
                records.push(event::decode(&mut bytes, version)?);
            }
            RecordBatch::Event(records)
        }
        RecordKind::Suspend => {
            let mut records = Vec::with_capacity(count);
            for _ in 0..count {
                records.push(suspend::decode(&mut bytes, version)?);
            }
            RecordBatch::Suspend(records)
        }
        RecordKind::Step => {
            let mut records = Vec::with_capacity(count);
            for _ in 0..count {
                records.push(step::decode(&mut bytes, version)?);
            }
            RecordBatch::Step(records)
        }
        RecordKind::Job => {
            let mut records = Vec::with_capacity(count);
            for _ in 0..count {
                records.push(job::decode(&mut bytes, version)?);
            }
            RecordBatch::Job(records)
        }
        RecordKind::Reservation => {
            let mut records = Vec::with_capacity(count);
            for _ in 0..count {
                records.push(reservation::decode(&mut bytes, version)?);
            }
            RecordBatch::Reservation(records)
        }
    };

    Ok((header, batch))
}
