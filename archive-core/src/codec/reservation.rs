//! Reservation record wire codec. Two tiers: pre-TRES (bare CPU count,
//! synthesized into `tres` as the second field on the wire) and current
//! (generic `tres` string written last) — same split as events.

use bytes::{Buf, BufMut};

use crate::constants::{thresholds, CPU_TRES_ID};
use crate::error::ArchiveResult;
use crate::record::ReservationRecord;

use super::primitives::{get_str, put_str};

pub fn encode(record: &ReservationRecord, buf: &mut impl BufMut) {
    put_str(buf, &record.assoclist);
    put_str(buf, &record.flags);
    put_str(buf, &record.id_resv);
    put_str(buf, &record.resv_name);
    put_str(buf, &record.nodelist);
    put_str(buf, &record.node_inx);
    put_str(buf, &record.time_end);
    put_str(buf, &record.time_start);
    put_str(buf, &record.tres);
}

pub fn decode(buf: &mut impl Buf, version: u16) -> ArchiveResult<ReservationRecord> {
    let assoclist = get_str(buf)?;

    let legacy_tres = if version < thresholds::TRES_INTRODUCED {
        let cpu_count = get_str(buf)?;
        Some(format!("{CPU_TRES_ID}={cpu_count}"))
    } else {
        None
    };

    let flags = get_str(buf)?;
    let id_resv = get_str(buf)?;
    let resv_name = get_str(buf)?;
    let nodelist = get_str(buf)?;
    let node_inx = get_str(buf)?;
    let time_end = get_str(buf)?;
    let time_start = get_str(buf)?;

    let tres = match legacy_tres {
        Some(tres) => tres,
        None => get_str(buf)?,
    };

    Ok(ReservationRecord {
        id_resv,
        assoclist,
        flags,
        tres,
        nodelist,
        node_inx,
        resv_name,
        time_start,
        time_end,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    /// Writes a reservation in the pre-TRES legacy wire order: a bare CPU
    /// count synthesized as the second field, right after `assoclist`,
    /// matching `_pack_local_resv`'s `else` branch.
    fn encode_legacy_tier(buf: &mut impl BufMut, assoclist: &str, cpu_count: &str) {
        put_str(buf, assoclist);
        put_str(buf, cpu_count);
        put_str(buf, "0x1");
        put_str(buf, "7");
        put_str(buf, "maint");
        put_str(buf, "node1");
        put_str(buf, "0-0");
        put_str(buf, "200");
        put_str(buf, "100");
    }

    #[test]
    fn legacy_tier_synthesizes_tres_as_second_field() {
        let mut buf = BytesMut::new();
        encode_legacy_tier(&mut buf, "1,2", "4");

        let record = decode(&mut buf, thresholds::TRES_INTRODUCED - 1).unwrap();

        assert_eq!(record.assoclist, "1,2");
        assert_eq!(record.tres, format!("{CPU_TRES_ID}=4"));
        assert_eq!(record.flags, "0x1");
        assert_eq!(record.id_resv, "7");
        assert_eq!(record.time_end, "200");
        assert_eq!(record.time_start, "100");
    }

    #[test]
    fn current_tier_round_trips() {
        let record = ReservationRecord {
            id_resv: "7".to_string(),
            assoclist: "1,2".to_string(),
            flags: "0x1".to_string(),
            tres: "1=4".to_string(),
            nodelist: "node1".to_string(),
            node_inx: "0-0".to_string(),
            resv_name: "maint".to_string(),
            time_start: "100".to_string(),
            time_end: "200".to_string(),
        };
        let mut buf = BytesMut::new();
        encode(&record, &mut buf);
        let decoded = decode(&mut buf, thresholds::TRES_INTRODUCED).unwrap();
        assert_eq!(decoded, record);
    }
}
