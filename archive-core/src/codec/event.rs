//! Event record wire codec. Two tiers: pre-TRES (bare CPU count, synthesized
//! into `tres` as the second field on the wire) and current (generic `tres`
//! string written last).

use bytes::{Buf, BufMut};

use crate::constants::{thresholds, CPU_TRES_ID};
use crate::error::ArchiveResult;
use crate::record::EventRecord;

use super::primitives::{get_str, put_str};

pub fn encode(record: &EventRecord, buf: &mut impl BufMut) {
    put_str(buf, &record.cluster_nodes);
    put_str(buf, &record.node_name);
    put_str(buf, &record.time_end);
    put_str(buf, &record.time_start);
    put_str(buf, &record.reason);
    put_str(buf, &record.reason_uid);
    put_str(buf, &record.state);
    put_str(buf, &record.tres);
}

pub fn decode(buf: &mut impl Buf, version: u16) -> ArchiveResult<EventRecord> {
    let cluster_nodes = get_str(buf)?;

    let legacy_tres = if version < thresholds::TRES_INTRODUCED {
        let cpu_count = get_str(buf)?;
        Some(format!("{CPU_TRES_ID}={cpu_count}"))
    } else {
        None
    };

    let node_name = get_str(buf)?;
    let time_end = get_str(buf)?;
    let time_start = get_str(buf)?;
    let reason = get_str(buf)?;
    let reason_uid = get_str(buf)?;
    let state = get_str(buf)?;

    let tres = match legacy_tres {
        Some(tres) => tres,
        None => get_str(buf)?,
    };

    Ok(EventRecord {
        time_start,
        time_end,
        node_name,
        cluster_nodes,
        reason,
        reason_uid,
        state,
        tres,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    /// Writes an event record in the pre-TRES legacy wire order: a bare
    /// CPU count synthesized as the second field, right after
    /// `cluster_nodes`, matching `_pack_local_event`'s `else` branch.
    fn encode_legacy_tier(buf: &mut impl BufMut, cluster_nodes: &str, cpu_count: &str) {
        put_str(buf, cluster_nodes);
        put_str(buf, cpu_count);
        put_str(buf, "node1");
        put_str(buf, "200");
        put_str(buf, "100");
        put_str(buf, "maint");
        put_str(buf, "0");
        put_str(buf, "1");
    }

    #[test]
    fn legacy_tier_synthesizes_tres_as_second_field() {
        let mut buf = BytesMut::new();
        encode_legacy_tier(&mut buf, "node[1-2]", "8");

        let record = decode(&mut buf, thresholds::TRES_INTRODUCED - 1).unwrap();

        assert_eq!(record.cluster_nodes, "node[1-2]");
        assert_eq!(record.tres, format!("{CPU_TRES_ID}=8"));
        assert_eq!(record.node_name, "node1");
        assert_eq!(record.time_end, "200");
        assert_eq!(record.time_start, "100");
        assert_eq!(record.reason, "maint");
    }

    #[test]
    fn current_tier_round_trips() {
        let record = EventRecord {
            time_start: "100".to_string(),
            time_end: "200".to_string(),
            node_name: "node1".to_string(),
            cluster_nodes: "node[1-2]".to_string(),
            reason: "maint".to_string(),
            reason_uid: "0".to_string(),
            state: "1".to_string(),
            tres: "1=8".to_string(),
        };
        let mut buf = BytesMut::new();
        encode(&record, &mut buf);
        let decoded = decode(&mut buf, thresholds::TRES_INTRODUCED).unwrap();
        assert_eq!(decoded, record);
    }
}
