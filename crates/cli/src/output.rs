//! Console formatting helpers

use std::time::Duration;

/// Render a wall-clock duration for the build summary
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}.{:02}s", secs, millis / 10)
    } else {
        format!("{}ms", millis)
    }
}
