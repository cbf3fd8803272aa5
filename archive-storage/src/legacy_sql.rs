//! Legacy-SQL rewriter: translates an older single-cluster SQL dialect into
//! the current per-cluster table schema, one statement per cluster name
//! found in the `VALUES` tuples.
//!
//! This is a single left-to-right scan, not a SQL parser: it understands
//! exactly the four statement shapes the old dumps use
//! (`insert into`/`delete from`/`drop table`/`truncate table`) and the
//! narrow column-list/values grammar those dumps were generated with.
//! Anything else is a grammar error for that statement only; the scan
//! resumes at the next `;`.

use tracing::warn;

const OLD_TO_NEW_TABLE: &[(&str, &str)] = &[
    ("cluster_event_table", "event_table"),
    ("event_table", "event_table"),
    ("job_table", "job_table"),
    ("step_table", "step_table"),
    ("suspend_table", "suspend_table"),
    ("resv_table", "resv_table"),
    ("cluster_usage_table", "usage_table"),
    ("assoc_usage_table", "usage_table"),
];

/// Column renames. Two legacy names (`name`, `id`) are ambiguous and are
/// resolved against the destination table at rewrite time instead of
/// appearing in this flat table.
const COLUMN_RENAMES: &[(&str, &str)] = &[
    ("period_start", "time_start"),
    ("period_end", "time_end"),
    ("cpu_count", "count"),
    ("jobid", "id_job"),
    ("stepid", "id_step"),
    ("associd", "id_assoc"),
    ("blockid", "id_block"),
    ("wckeyid", "id_wckey"),
    ("qos", "id_qos"),
    ("uid", "id_user"),
    ("gid", "id_group"),
    ("submit", "time_submit"),
    ("eligible", "time_eligible"),
    ("start", "time_start"),
    ("suspended", "time_suspended"),
    ("end", "time_end"),
    ("comp_code", "exit_code"),
    ("alloc_cpus", "cpus_alloc"),
    ("req_cpus", "cpus_req"),
    ("alloc_nodes", "nodes_alloc"),
];

/// Rewrites a whole legacy SQL dump, returning the emitted per-cluster
/// statements in source order. Statements that fail to parse are logged
/// and dropped; the scan continues past the following `;`.
pub fn rewrite(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    for raw_stmt in split_statements(text) {
        let stmt = raw_stmt.trim();
        if stmt.is_empty() {
            continue;
        }
        match rewrite_statement(stmt) {
            Ok(mut emitted) => out.append(&mut emitted),
            Err(e) => warn!(statement = %stmt, error = %e, "dropping unparseable legacy SQL statement"),
        }
    }
    out
}

fn split_statements(text: &str) -> Vec<&str> {
    text.split(';').collect()
}

fn rewrite_statement(stmt: &str) -> Result<Vec<String>, String> {
    let lower = stmt.to_ascii_lowercase();

    if let Some(rest) = lower.strip_prefix("insert into ") {
        let old_table = first_word(rest);
        let new_table = resolve_table(old_table)?;
        let original_rest = &stmt[stmt.len() - rest.len()..];
        return rewrite_insert(original_rest, old_table, new_table);
    }

    for (kw, table_kw) in [("delete from ", "delete from "), ("drop table ", "drop table "), ("truncate table ", "truncate table ")] {
        if let Some(rest) = lower.strip_prefix(kw) {
            let old_table = first_word(rest);
            let new_table = resolve_table(old_table)?;
            // No VALUES clause to read a cluster literal from, so these
            // three forms pass through with only the table name rewritten.
            let original_rest = &stmt[stmt.len() - rest.len()..];
            let after_table = &original_rest[old_table.len()..];
            return Ok(vec![format!("{table_kw}\"{new_table}\"{after_table}")]);
        }
    }

    Err("unrecognized statement kind".to_string())
}

fn first_word(s: &str) -> &str {
    s.split(|c: char| c.is_whitespace() || c == '(').next().unwrap_or("").trim()
}

fn resolve_table(old_table: &str) -> Result<&'static str, String> {
    OLD_TO_NEW_TABLE
        .iter()
        .find(|(old, _)| *old == old_table)
        .map(|(_, new)| *new)
        .ok_or_else(|| format!("unknown legacy table: {old_table}"))
}

/// Rewrites `insert into <oldtable> (<cols>) values (<tuple>), (<tuple>), ...
/// [on duplicate key update <assignments>]` into one statement per distinct
/// cluster literal found in the tuples.
fn rewrite_insert(rest: &str, old_table: &str, new_table: &str) -> Result<Vec<String>, String> {
    let rest = rest[old_table.len()..].trim_start();

    let (col_list_raw, after_cols) = take_parenthesized(rest).ok_or("missing column list")?;
    let columns: Vec<String> = col_list_raw.split(',').map(|c| c.trim().to_string()).collect();

    let cluster_ord = columns
        .iter()
        .position(|c| c.eq_ignore_ascii_case("cluster"))
        .ok_or("missing cluster column")?;

    let renamed_columns: Vec<String> = columns
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != cluster_ord)
        .map(|(_, c)| rename_column(c, new_table))
        .collect();

    let lower_after_cols = after_cols.to_ascii_lowercase();
    let values_pos = lower_after_cols
        .find("values")
        .ok_or("missing VALUES clause")?;
    let values_and_trailer = &after_cols[values_pos + "values".len()..];
    let lower_values_and_trailer = &lower_after_cols[values_pos + "values".len()..];

    const ON_DUP: &str = "on duplicate key update";
    let (tuples_text, trailer) = match lower_values_and_trailer.find(ON_DUP) {
        Some(trailer_offset) => (
            &values_and_trailer[..trailer_offset],
            Some(&values_and_trailer[trailer_offset + ON_DUP.len()..]),
        ),
        None => (values_and_trailer, None),
    };

    let tuples = split_tuples(tuples_text)?;

    let mut by_cluster: Vec<(String, Vec<Vec<String>>)> = Vec::new();
    for tuple in tuples {
        let values = split_csv_respecting_quotes(&tuple)?;
        if values.len() != columns.len() {
            return Err(format!(
                "tuple has {} values, expected {}",
                values.len(),
                columns.len()
            ));
        }
        let cluster_literal = unquote(values[cluster_ord].trim());
        let remaining: Vec<String> = values
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != cluster_ord)
            .map(|(_, v)| v.trim().to_string())
            .collect();
        match by_cluster.iter_mut().find(|(c, _)| *c == cluster_literal) {
            Some((_, rows)) => rows.push(remaining),
            None => by_cluster.push((cluster_literal, vec![remaining])),
        }
    }

    let mut out = Vec::new();
    for (cluster, rows) in by_cluster {
        let table_name = format!("{cluster}_{new_table}");
        let values_sql = rows
            .iter()
            .map(|r| format!("({})", r.join(", ")))
            .collect::<Vec<_>>()
            .join(", ");
        let mut stmt = format!(
            "insert into \"{table_name}\" ({}) values {values_sql}",
            renamed_columns.join(", ")
        );
        if let Some(t) = trailer {
            stmt.push_str(" on duplicate key update");
            stmt.push_str(&rename_trailer(t, new_table));
        }
        stmt.push(';');
        out.push(stmt);
    }

    Ok(out)
}

fn rename_column(col: &str, table: &str) -> String {
    let col = col.trim();
    if col.eq_ignore_ascii_case("name") {
        return if table == "step_table" { "step_name" } else { "job_name" }.to_string();
    }
    if col.eq_ignore_ascii_case("id") {
        return if table == "job_table" { "job_db_inx" } else { "id_assoc" }.to_string();
    }
    COLUMN_RENAMES
        .iter()
        .find(|(old, _)| col.eq_ignore_ascii_case(old))
        .map(|(_, new)| new.to_string())
        .unwrap_or_else(|| col.to_string())
}

fn rename_trailer(trailer: &str, table: &str) -> String {
    let mut result = trailer.to_string();
    for (old, new) in COLUMN_RENAMES {
        result = replace_word(&result, old, new);
    }
    if table == "step_table" {
        result = replace_word(&result, "name", "step_name");
    } else {
        result = replace_word(&result, "name", "job_name");
    }
    result
}

fn replace_word(haystack: &str, word: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(haystack.len());
    let mut rest = haystack;
    while let Some(pos) = rest.to_ascii_lowercase().find(word) {
        let before_ok = pos == 0 || !rest.as_bytes()[pos - 1].is_ascii_alphanumeric();
        let after = pos + word.len();
        let after_ok = after >= rest.len() || !rest.as_bytes()[after].is_ascii_alphanumeric();
        out.push_str(&rest[..pos]);
        if before_ok && after_ok {
            out.push_str(replacement);
        } else {
            out.push_str(&rest[pos..after]);
        }
        rest = &rest[after..];
    }
    out.push_str(rest);
    out
}

/// Returns the text between the first balanced `(...)` pair and the rest of
/// the string after the closing paren.
fn take_parenthesized(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if !s.starts_with('(') {
        return None;
    }
    let mut depth = 0i32;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some((&s[1..i], &s[i + 1..]));
                }
            }
            _ => {}
        }
    }
    None
}

/// Splits a `(a, b), (c, d)` tuple list into its parenthesized pieces.
fn split_tuples(s: &str) -> Result<Vec<String>, String> {
    let mut out = Vec::new();
    let mut rest = s.trim_start();
    while !rest.is_empty() {
        let (inner, after) = take_parenthesized(rest).ok_or("malformed values tuple")?;
        out.push(inner.to_string());
        rest = after.trim_start();
        if let Some(stripped) = rest.strip_prefix(',') {
            rest = stripped.trim_start();
        }
    }
    if out.is_empty() {
        return Err("no value tuples found".to_string());
    }
    Ok(out)
}

/// Splits a comma-separated value list, treating `'...'` as an opaque span
/// so commas inside quoted strings don't split early.
fn split_csv_respecting_quotes(s: &str) -> Result<Vec<String>, String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            ',' if !in_quotes => {
                out.push(current.trim().to_string());
                current = String::new();
            }
            _ => current.push(c),
        }
    }
    if in_quotes {
        return Err("unterminated quoted value".to_string());
    }
    out.push(current.trim().to_string());
    Ok(out)
}

fn unquote(s: &str) -> String {
    let s = s.trim();
    if s.len() >= 2 && s.starts_with('\'') && s.ends_with('\'') {
        s[1..s.len() - 1].replace("''", "'")
    } else {
        s.to_string()
    }
}
