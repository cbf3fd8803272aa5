//! Suspend record wire codec. One layout across every supported version.

use bytes::{Buf, BufMut};

use crate::error::ArchiveResult;
use crate::record::SuspendRecord;

use super::primitives::{get_str, put_str};

pub fn encode(record: &SuspendRecord, buf: &mut impl BufMut) {
    put_str(buf, &record.id_assoc);
    put_str(buf, &record.job_db_inx);
    put_str(buf, &record.time_end);
    put_str(buf, &record.time_start);
}

pub fn decode(buf: &mut impl Buf, _version: u16) -> ArchiveResult<SuspendRecord> {
    Ok(SuspendRecord {
        id_assoc: get_str(buf)?,
        job_db_inx: get_str(buf)?,
        time_end: get_str(buf)?,
        time_start: get_str(buf)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn field_order_matches_associd_before_job_db_inx_end_before_start() {
        let mut buf = BytesMut::new();
        put_str(&mut buf, "12");
        put_str(&mut buf, "55");
        put_str(&mut buf, "200");
        put_str(&mut buf, "100");

        let record = decode(&mut buf, 0).unwrap();

        assert_eq!(record.id_assoc, "12");
        assert_eq!(record.job_db_inx, "55");
        assert_eq!(record.time_end, "200");
        assert_eq!(record.time_start, "100");
    }

    #[test]
    fn round_trips() {
        let record = SuspendRecord {
            job_db_inx: "55".to_string(),
            id_assoc: "12".to_string(),
            time_start: "100".to_string(),
            time_end: "200".to_string(),
        };
        let mut buf = BytesMut::new();
        encode(&record, &mut buf);
        let decoded = decode(&mut buf, 0).unwrap();
        assert_eq!(decoded, record);
    }
}
