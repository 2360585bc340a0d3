/// Format a duration in milliseconds as `mm:ss`, rounding down.
///
/// Minutes are not capped, so long recordings render as e.g. `73:09`.
pub fn format_mmss(ms: u64) -> String {
    let total_secs = ms / 1000;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}
