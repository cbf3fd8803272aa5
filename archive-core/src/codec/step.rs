//! Step record wire codec.
//!
//! Two tiers: the current layout (full cpufreq min/req/gov split, `tres_alloc`
//! written inline among the trailing fields) and a legacy layout used at or
//! below `thresholds::STEP_MIN_SUPPORTED`, where TRES was synthesized from a
//! bare CPU count immediately after `consumed_energy` and only a single
//! `req_cpufreq` field existed — the min/gov split came later. Anything
//! older than that is rejected outright, matching the source's
//! `goto unpack_error` for pre-2.6 step buffers.

use bytes::{Buf, BufMut};

use crate::constants::{thresholds, CPU_TRES_ID};
use crate::error::{ArchiveError, ArchiveResult};
use crate::record::StepRecord;

use super::primitives::{get_str, put_str};

pub fn encode(record: &StepRecord, buf: &mut impl BufMut) {
    put_str(buf, &record.act_cpufreq);
    put_str(buf, &record.ave_cpu);
    put_str(buf, &record.ave_disk_read);
    put_str(buf, &record.ave_disk_write);
    put_str(buf, &record.ave_pages);
    put_str(buf, &record.ave_rss);
    put_str(buf, &record.ave_vsize);
    put_str(buf, &record.exit_code);
    put_str(buf, &record.consumed_energy);
    put_str(buf, &record.job_db_inx);
    put_str(buf, &record.kill_requid);
    put_str(buf, &record.max_disk_read);
    put_str(buf, &record.max_disk_read_node);
    put_str(buf, &record.max_disk_read_task);
    put_str(buf, &record.max_disk_write);
    put_str(buf, &record.max_disk_write_node);
    put_str(buf, &record.max_disk_write_task);
    put_str(buf, &record.max_pages);
    put_str(buf, &record.max_pages_node);
    put_str(buf, &record.max_pages_task);
    put_str(buf, &record.max_rss);
    put_str(buf, &record.max_rss_node);
    put_str(buf, &record.max_rss_task);
    put_str(buf, &record.max_vsize);
    put_str(buf, &record.max_vsize_node);
    put_str(buf, &record.max_vsize_task);
    put_str(buf, &record.min_cpu);
    put_str(buf, &record.min_cpu_node);
    put_str(buf, &record.min_cpu_task);
    put_str(buf, &record.step_name);
    put_str(buf, &record.nodelist);
    put_str(buf, &record.nodes_alloc);
    put_str(buf, &record.node_inx);
    put_str(buf, &record.time_end);
    put_str(buf, &record.time_start);
    put_str(buf, &record.time_suspended);
    put_str(buf, &record.req_cpufreq_min);
    put_str(buf, &record.req_cpufreq);
    put_str(buf, &record.req_cpufreq_gov);
    put_str(buf, &record.state);
    put_str(buf, &record.id_step);
    put_str(buf, &record.sys_sec);
    put_str(buf, &record.sys_usec);
    put_str(buf, &record.task_cnt);
    put_str(buf, &record.task_dist);
    put_str(buf, &record.tres_alloc);
    put_str(buf, &record.user_sec);
    put_str(buf, &record.user_usec);
}

pub fn decode(buf: &mut impl Buf, version: u16) -> ArchiveResult<StepRecord> {
    if version < thresholds::STEP_MIN_SUPPORTED {
        return Err(ArchiveError::UnsupportedVersion(version));
    }

    let act_cpufreq = get_str(buf)?;
    let ave_cpu = get_str(buf)?;
    let ave_disk_read = get_str(buf)?;
    let ave_disk_write = get_str(buf)?;
    let ave_pages = get_str(buf)?;
    let ave_rss = get_str(buf)?;
    let ave_vsize = get_str(buf)?;
    let exit_code = get_str(buf)?;
    let consumed_energy = get_str(buf)?;

    if version < thresholds::STEP_CURRENT {
        let cpu_count = get_str(buf)?;
        let tres_alloc = format!("{CPU_TRES_ID}={cpu_count}");

        let job_db_inx = get_str(buf)?;
        let kill_requid = get_str(buf)?;
        let max_disk_read = get_str(buf)?;
        let max_disk_read_node = get_str(buf)?;
        let max_disk_read_task = get_str(buf)?;
        let max_disk_write = get_str(buf)?;
        let max_disk_write_node = get_str(buf)?;
        let max_disk_write_task = get_str(buf)?;
        let max_pages = get_str(buf)?;
        let max_pages_node = get_str(buf)?;
        let max_pages_task = get_str(buf)?;
        let max_rss = get_str(buf)?;
        let max_rss_node = get_str(buf)?;
        let max_rss_task = get_str(buf)?;
        let max_vsize = get_str(buf)?;
        let max_vsize_node = get_str(buf)?;
        let max_vsize_task = get_str(buf)?;
        let min_cpu = get_str(buf)?;
        let min_cpu_node = get_str(buf)?;
        let min_cpu_task = get_str(buf)?;
        let step_name = get_str(buf)?;
        let nodelist = get_str(buf)?;
        let nodes_alloc = get_str(buf)?;
        let node_inx = get_str(buf)?;
        let time_end = get_str(buf)?;
        let time_start = get_str(buf)?;
        let time_suspended = get_str(buf)?;
        let req_cpufreq = get_str(buf)?;
        let state = get_str(buf)?;
        let id_step = get_str(buf)?;
        let sys_sec = get_str(buf)?;
        let sys_usec = get_str(buf)?;
        let task_cnt = get_str(buf)?;
        let task_dist = get_str(buf)?;
        let user_sec = get_str(buf)?;
        let user_usec = get_str(buf)?;

        return Ok(StepRecord {
            job_db_inx,
            id_step,
            time_start,
            time_end,
            time_suspended,
            step_name,
            nodelist,
            node_inx,
            state,
            kill_requid,
            exit_code,
            nodes_alloc,
            task_cnt,
            task_dist,
            user_sec,
            user_usec,
            sys_sec,
            sys_usec,
            max_vsize,
            max_vsize_task,
            max_vsize_node,
            ave_vsize,
            max_rss,
            max_rss_task,
            max_rss_node,
            ave_rss,
            max_pages,
            max_pages_task,
            max_pages_node,
            ave_pages,
            min_cpu,
            min_cpu_task,
            min_cpu_node,
            ave_cpu,
            act_cpufreq,
            consumed_energy,
            req_cpufreq_min: String::new(),
            req_cpufreq,
            req_cpufreq_gov: String::new(),
            max_disk_read,
            max_disk_read_task,
            max_disk_read_node,
            ave_disk_read,
            max_disk_write,
            max_disk_write_task,
            max_disk_write_node,
            ave_disk_write,
            tres_alloc,
        });
    }

    let job_db_inx = get_str(buf)?;
    let kill_requid = get_str(buf)?;
    let max_disk_read = get_str(buf)?;
    let max_disk_read_node = get_str(buf)?;
    let max_disk_read_task = get_str(buf)?;
    let max_disk_write = get_str(buf)?;
    let max_disk_write_node = get_str(buf)?;
    let max_disk_write_task = get_str(buf)?;
    let max_pages = get_str(buf)?;
    let max_pages_node = get_str(buf)?;
    let max_pages_task = get_str(buf)?;
    let max_rss = get_str(buf)?;
    let max_rss_node = get_str(buf)?;
    let max_rss_task = get_str(buf)?;
    let max_vsize = get_str(buf)?;
    let max_vsize_node = get_str(buf)?;
    let max_vsize_task = get_str(buf)?;
    let min_cpu = get_str(buf)?;
    let min_cpu_node = get_str(buf)?;
    let min_cpu_task = get_str(buf)?;
    let step_name = get_str(buf)?;
    let nodelist = get_str(buf)?;
    let nodes_alloc = get_str(buf)?;
    let node_inx = get_str(buf)?;
    let time_end = get_str(buf)?;
    let time_start = get_str(buf)?;
    let time_suspended = get_str(buf)?;
    let req_cpufreq_min = get_str(buf)?;
    let req_cpufreq = get_str(buf)?;
    let req_cpufreq_gov = get_str(buf)?;
    let state = get_str(buf)?;
    let id_step = get_str(buf)?;
    let sys_sec = get_str(buf)?;
    let sys_usec = get_str(buf)?;
    let task_cnt = get_str(buf)?;
    let task_dist = get_str(buf)?;
    let tres_alloc = get_str(buf)?;
    let user_sec = get_str(buf)?;
    let user_usec = get_str(buf)?;

    Ok(StepRecord {
        job_db_inx,
        id_step,
        time_start,
        time_end,
        time_suspended,
        step_name,
        nodelist,
        node_inx,
        state,
        kill_requid,
        exit_code,
        nodes_alloc,
        task_cnt,
        task_dist,
        user_sec,
        user_usec,
        sys_sec,
        sys_usec,
        max_vsize,
        max_vsize_task,
        max_vsize_node,
        ave_vsize,
        max_rss,
        max_rss_task,
        max_rss_node,
        ave_rss,
        max_pages,
        max_pages_task,
        max_pages_node,
        ave_pages,
        min_cpu,
        min_cpu_task,
        min_cpu_node,
        ave_cpu,
        act_cpufreq,
        consumed_energy,
        req_cpufreq_min,
        req_cpufreq,
        req_cpufreq_gov,
        max_disk_read,
        max_disk_read_task,
        max_disk_read_node,
        ave_disk_read,
        max_disk_write,
        max_disk_write_task,
        max_disk_write_node,
        ave_disk_write,
        tres_alloc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    fn blank_step() -> StepRecord {
        StepRecord {
            job_db_inx: String::new(),
            id_step: String::new(),
            time_start: String::new(),
            time_end: String::new(),
            time_suspended: String::new(),
            step_name: String::new(),
            nodelist: String::new(),
            node_inx: String::new(),
            state: String::new(),
            kill_requid: String::new(),
            exit_code: String::new(),
            nodes_alloc: String::new(),
            task_cnt: String::new(),
            task_dist: String::new(),
            user_sec: String::new(),
            user_usec: String::new(),
            sys_sec: String::new(),
            sys_usec: String::new(),
            max_vsize: String::new(),
            max_vsize_task: String::new(),
            max_vsize_node: String::new(),
            ave_vsize: String::new(),
            max_rss: String::new(),
            max_rss_task: String::new(),
            max_rss_node: String::new(),
            ave_rss: String::new(),
            max_pages: String::new(),
            max_pages_task: String::new(),
            max_pages_node: String::new(),
            ave_pages: String::new(),
            min_cpu: String::new(),
            min_cpu_task: String::new(),
            min_cpu_node: String::new(),
            ave_cpu: String::new(),
            act_cpufreq: String::new(),
            consumed_energy: String::new(),
            req_cpufreq_min: String::new(),
            req_cpufreq: String::new(),
            req_cpufreq_gov: String::new(),
            max_disk_read: String::new(),
            max_disk_read_task: String::new(),
            max_disk_read_node: String::new(),
            ave_disk_read: String::new(),
            max_disk_write: String::new(),
            max_disk_write_task: String::new(),
            max_disk_write_node: String::new(),
            ave_disk_write: String::new(),
            tres_alloc: String::new(),
        }
    }

    /// Writes a step record in the pre-`STEP_CURRENT` legacy wire order:
    /// bare CPU count synthesized as `tres_alloc` right after
    /// `consumed_energy`, and a single `req_cpufreq` field in place of the
    /// min/max/gov split — matching `_unpack_local_step`'s
    /// `SLURMDBD_2_6_VERSION` branch.
    fn encode_legacy_tier(buf: &mut impl BufMut) {
        put_str(buf, "0"); // act_cpufreq
        put_str(buf, "0"); // ave_cpu
        put_str(buf, "0"); // ave_disk_read
        put_str(buf, "0"); // ave_disk_write
        put_str(buf, "0"); // ave_pages
        put_str(buf, "512"); // ave_rss
        put_str(buf, "1024"); // ave_vsize
        put_str(buf, "0:0"); // exit_code
        put_str(buf, "0"); // consumed_energy
        put_str(buf, "4"); // cpu_count -> tres_alloc
        put_str(buf, "55"); // job_db_inx
        put_str(buf, "-1"); // kill_requid
        put_str(buf, "0"); // max_disk_read
        put_str(buf, "0"); // max_disk_read_node
        put_str(buf, "0"); // max_disk_read_task
        put_str(buf, "0"); // max_disk_write
        put_str(buf, "0"); // max_disk_write_node
        put_str(buf, "0"); // max_disk_write_task
        put_str(buf, "0"); // max_pages
        put_str(buf, "0"); // max_pages_node
        put_str(buf, "0"); // max_pages_task
        put_str(buf, "512"); // max_rss
        put_str(buf, "0"); // max_rss_node
        put_str(buf, "0"); // max_rss_task
        put_str(buf, "1024"); // max_vsize
        put_str(buf, "0"); // max_vsize_node
        put_str(buf, "0"); // max_vsize_task
        put_str(buf, "0"); // min_cpu
        put_str(buf, "0"); // min_cpu_node
        put_str(buf, "0"); // min_cpu_task
        put_str(buf, "step1"); // step_name
        put_str(buf, "node1"); // nodelist
        put_str(buf, "1"); // nodes_alloc
        put_str(buf, "0-0"); // node_inx
        put_str(buf, "200"); // time_end
        put_str(buf, "100"); // time_start
        put_str(buf, "0"); // time_suspended
        put_str(buf, "0"); // req_cpufreq (only field in this tier)
        put_str(buf, "3"); // state
        put_str(buf, "0"); // id_step
        put_str(buf, "0"); // sys_sec
        put_str(buf, "0"); // sys_usec
        put_str(buf, "1"); // task_cnt
        put_str(buf, "0"); // task_dist
        put_str(buf, "1"); // user_sec
        put_str(buf, "0"); // user_usec
    }

    #[test]
    fn legacy_tier_synthesizes_tres_after_consumed_energy() {
        let mut buf = BytesMut::new();
        encode_legacy_tier(&mut buf);

        let version = thresholds::STEP_CURRENT - 1;
        let record = decode(&mut buf, version).unwrap();

        assert_eq!(record.tres_alloc, format!("{CPU_TRES_ID}=4"));
        assert_eq!(record.job_db_inx, "55");
        assert_eq!(record.time_end, "200");
        assert_eq!(record.time_start, "100");
        assert_eq!(record.req_cpufreq, "0");
        assert_eq!(record.req_cpufreq_min, "");
        assert_eq!(record.req_cpufreq_gov, "");
    }

    #[test]
    fn below_min_supported_is_rejected() {
        let mut buf = BytesMut::new();
        let err = decode(&mut buf, thresholds::STEP_MIN_SUPPORTED - 1).unwrap_err();
        assert!(matches!(err, ArchiveError::UnsupportedVersion(_)));
    }

    #[test]
    fn current_tier_round_trips() {
        let mut record = blank_step();
        record.job_db_inx = "55".to_string();
        record.id_step = "0".to_string();
        record.time_start = "100".to_string();
        record.time_end = "200".to_string();
        record.step_name = "step1".to_string();
        record.nodelist = "node1".to_string();
        record.nodes_alloc = "1".to_string();
        record.req_cpufreq_min = "0".to_string();
        record.req_cpufreq = "0".to_string();
        record.req_cpufreq_gov = "0".to_string();
        record.tres_alloc = "1=4".to_string();

        let mut buf = BytesMut::new();
        encode(&record, &mut buf);
        let decoded = decode(&mut buf, thresholds::STEP_CURRENT).unwrap();
        assert_eq!(decoded, record);
    }
}
