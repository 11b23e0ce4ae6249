//! Parsing for `tasklist /FO CSV /NH` output.

/// Whether any row of `tasklist` CSV output lists `pid` in its PID column.
///
/// Rows look like `"Image Name","PID","Session Name","Session#","Mem Usage"`.
/// Image names may contain spaces and memory figures contain commas, so
/// fields are split on the quoted separator. A filter with no match prints
/// an `INFO:` line instead of a row.
#[cfg_attr(not(windows), allow(dead_code))]
pub(crate) fn lists_pid(stdout: &str, pid: u32) -> bool {
    let wanted = pid.to_string();
    stdout.lines().any(|line| {
        line.trim()
            .strip_prefix('"')
            .and_then(|row| row.split("\",\"").nth(1))
            .is_some_and(|column| column == wanted)
    })
}
