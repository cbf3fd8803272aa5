//! The archive buffer header: version, wall-clock time, record kind, cluster
//! name, and record count, in that wire order ahead of the record stream.

use bytes::{Buf, BufMut};

use crate::constants::CURRENT_VERSION;
use crate::error::{ArchiveError, ArchiveResult};
use crate::record::RecordKind;

use super::primitives::{get_str, put_str};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub protocol_version: u16,
    pub wall_time: i64,
    pub record_kind: RecordKind,
    pub cluster_name: String,
    pub record_count: u32,
}

impl Header {
    pub fn encode(&self, buf: &mut impl BufMut) {
        buf.put_u16(self.protocol_version);
        buf.put_i64(self.wall_time);
        buf.put_u16(self.record_kind.as_u16());
        put_str(buf, &self.cluster_name);
        buf.put_u32(self.record_count);
    }

    pub fn decode(buf: &mut impl Buf) -> ArchiveResult<Self> {
        if buf.remaining() < 2 + 8 + 2 {
            return Err(ArchiveError::CorruptArchive(
                "buffer too short for archive header".to_string(),
            ));
        }
        let protocol_version = buf.get_u16();
        if protocol_version > CURRENT_VERSION {
            return Err(ArchiveError::IncompatibleVersion {
                found: protocol_version,
                max: CURRENT_VERSION,
            });
        }
        let wall_time = buf.get_i64();
        let kind_tag = buf.get_u16();
        let record_kind = RecordKind::from_u16(kind_tag).ok_or_else(|| {
            ArchiveError::CorruptArchive(format!("unknown record kind tag {kind_tag}"))
        })?;
        let cluster_name = get_str(buf)?;
        if buf.remaining() < 4 {
            return Err(ArchiveError::CorruptArchive(
                "buffer truncated before record count".to_string(),
            ));
        }
        let record_count = buf.get_u32();
        Ok(Self {
            protocol_version,
            wall_time,
            record_kind,
            cluster_name,
            record_count,
        })
    }
}
