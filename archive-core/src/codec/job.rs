//! Job record wire codec.
//!
//! Four historical tiers, oldest first:
//!
//! - tier A (`JOB_MIN_SUPPORTED..JOB_REQ_MEM`): no `req_mem`, no array-job
//!   fields, TRES synthesized from a bare CPU count as the second field
//!   (right after `account`), and the group `{priority, id_qos, cpus_req,
//!   id_resv, partition}` written rotated (see `decode_rotated_group`
//!   below) rather than in field order.
//! - tier B (`JOB_REQ_MEM..JOB_ARRAY_FIELDS`): adds `req_mem` into the same
//!   rotated group, otherwise identical to tier A.
//! - tier C (`JOB_ARRAY_FIELDS..JOB_SYNCED_FIELD_ORDER`): adds the
//!   array-job fields right after `id_assoc`; the rotated group and
//!   synthesized TRES are unchanged from tier B.
//! - tier D (`JOB_SYNCED_FIELD_ORDER..`, current): natural field order,
//!   real `tres_alloc`/`tres_req` written late (after `track_steps`, before
//!   `id_user`).
//!
//! The rotation is a historical bug in the field order the original
//! producer wrote; later unpackers compensate for it on purpose rather than
//! fixing it, since fixing it would corrupt every archive written before
//! the compensation existed. We carry the same contract: never "fix" old
//! versions on read.

use bytes::{Buf, BufMut};

use crate::constants::{thresholds, CPU_TRES_ID};
use crate::error::{ArchiveError, ArchiveResult};
use crate::record::JobRecord;

use super::primitives::{get_str, put_str};

pub fn encode(record: &JobRecord, buf: &mut impl BufMut) {
    put_str(buf, &record.account);
    put_str(buf, &record.nodes_alloc);
    put_str(buf, &record.id_assoc);
    put_str(buf, &record.id_array_job);
    put_str(buf, &record.array_max_tasks);
    put_str(buf, &record.id_array_task);
    put_str(buf, &record.id_block);
    put_str(buf, &record.derived_ec);
    put_str(buf, &record.derived_es);
    put_str(buf, &record.exit_code);
    put_str(buf, &record.timelimit);
    put_str(buf, &record.time_eligible);
    put_str(buf, &record.time_end);
    put_str(buf, &record.id_group);
    put_str(buf, &record.job_db_inx);
    put_str(buf, &record.id_job);
    put_str(buf, &record.kill_requid);
    put_str(buf, &record.job_name);
    put_str(buf, &record.nodelist);
    put_str(buf, &record.node_inx);
    put_str(buf, &record.partition);
    put_str(buf, &record.priority);
    put_str(buf, &record.id_qos);
    put_str(buf, &record.cpus_req);
    put_str(buf, &record.req_mem);
    put_str(buf, &record.id_resv);
    put_str(buf, &record.time_start);
    put_str(buf, &record.state);
    put_str(buf, &record.time_submit);
    put_str(buf, &record.time_suspended);
    put_str(buf, &record.track_steps);
    put_str(buf, &record.tres_alloc);
    put_str(buf, &record.tres_req);
    put_str(buf, &record.id_user);
    put_str(buf, &record.wckey);
    put_str(buf, &record.id_wckey);
}

pub fn decode(buf: &mut impl Buf, version: u16) -> ArchiveResult<JobRecord> {
    if version < thresholds::JOB_MIN_SUPPORTED {
        return Err(ArchiveError::UnsupportedVersion(version));
    }
    if version >= thresholds::JOB_SYNCED_FIELD_ORDER {
        return decode_current(buf);
    }

    let mut record = JobRecord::blank_for_unpack();
    record.account = get_str(buf)?;

    let cpu_count = get_str(buf)?;
    record.tres_alloc = format!("{CPU_TRES_ID}={cpu_count}");
    record.tres_req = String::new();

    record.nodes_alloc = get_str(buf)?;
    record.id_assoc = get_str(buf)?;

    if version >= thresholds::JOB_ARRAY_FIELDS {
        record.id_array_job = get_str(buf)?;
        record.array_max_tasks = get_str(buf)?;
        record.id_array_task = get_str(buf)?;
    }

    record.id_block = get_str(buf)?;
    record.derived_ec = get_str(buf)?;
    record.derived_es = get_str(buf)?;
    record.exit_code = get_str(buf)?;
    record.timelimit = get_str(buf)?;
    record.time_eligible = get_str(buf)?;
    record.time_end = get_str(buf)?;
    record.id_group = get_str(buf)?;
    record.job_db_inx = get_str(buf)?;
    record.id_job = get_str(buf)?;
    record.kill_requid = get_str(buf)?;
    record.job_name = get_str(buf)?;
    record.nodelist = get_str(buf)?;
    record.node_inx = get_str(buf)?;

    decode_rotated_group(buf, version, &mut record)?;

    record.time_start = get_str(buf)?;
    record.state = get_str(buf)?;
    record.time_submit = get_str(buf)?;
    record.time_suspended = get_str(buf)?;
    record.track_steps = get_str(buf)?;
    record.id_user = get_str(buf)?;
    record.wckey = get_str(buf)?;
    record.id_wckey = get_str(buf)?;

    Ok(record)
}

/// Reads the historically-rotated `{priority, id_qos, cpus_req, [req_mem],
/// id_resv, partition}` group. The wire order puts `partition` last instead
/// of first, which is the documented field-order bug — preserved here
/// exactly, not corrected.
fn decode_rotated_group(
    buf: &mut impl Buf,
    version: u16,
    record: &mut JobRecord,
) -> ArchiveResult<()> {
    record.priority = get_str(buf)?;
    record.id_qos = get_str(buf)?;
    record.cpus_req = get_str(buf)?;
    if version >= thresholds::JOB_REQ_MEM {
        record.req_mem = get_str(buf)?;
    }
    record.id_resv = get_str(buf)?;
    record.partition = get_str(buf)?;
    Ok(())
}

fn decode_current(buf: &mut impl Buf) -> ArchiveResult<JobRecord> {
    let account = get_str(buf)?;
    let nodes_alloc = get_str(buf)?;
    let id_assoc = get_str(buf)?;
    let id_array_job = get_str(buf)?;
    let array_max_tasks = get_str(buf)?;
    let id_array_task = get_str(buf)?;
    let id_block = get_str(buf)?;
    let derived_ec = get_str(buf)?;
    let derived_es = get_str(buf)?;
    let exit_code = get_str(buf)?;
    let timelimit = get_str(buf)?;
    let time_eligible = get_str(buf)?;
    let time_end = get_str(buf)?;
    let id_group = get_str(buf)?;
    let job_db_inx = get_str(buf)?;
    let id_job = get_str(buf)?;
    let kill_requid = get_str(buf)?;
    let job_name = get_str(buf)?;
    let nodelist = get_str(buf)?;
    let node_inx = get_str(buf)?;
    let partition = get_str(buf)?;
    let priority = get_str(buf)?;
    let id_qos = get_str(buf)?;
    let cpus_req = get_str(buf)?;
    let req_mem = get_str(buf)?;
    let id_resv = get_str(buf)?;
    let time_start = get_str(buf)?;
    let state = get_str(buf)?;
    let time_submit = get_str(buf)?;
    let time_suspended = get_str(buf)?;
    let track_steps = get_str(buf)?;
    let tres_alloc = get_str(buf)?;
    let tres_req = get_str(buf)?;
    let id_user = get_str(buf)?;
    let wckey = get_str(buf)?;
    let id_wckey = get_str(buf)?;

    Ok(JobRecord {
        account,
        id_array_job,
        id_array_task,
        array_max_tasks,
        nodes_alloc,
        id_assoc,
        id_block,
        derived_ec,
        derived_es,
        exit_code,
        timelimit,
        time_eligible,
        time_end,
        id_group,
        job_db_inx,
        id_job,
        kill_requid,
        job_name,
        nodelist,
        node_inx,
        partition,
        priority,
        id_qos,
        cpus_req,
        req_mem,
        id_resv,
        time_start,
        state,
        time_submit,
        time_suspended,
        track_steps,
        id_user,
        wckey,
        id_wckey,
        tres_alloc,
        tres_req,
    })
}
