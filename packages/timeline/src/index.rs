use crate::timecode::Timecode;

/// Every timecode whose range contains `t`, in input order.
///
/// Both bounds are inclusive, so a zero-length timecode matches only at its
/// exact instant. A NaN position matches nothing.
pub fn active_at(timecodes: &[Timecode], t: f64) -> Vec<&Timecode> {
    timecodes.iter().filter(|tc| tc.is_active_at(t)).collect()
}

/// `MM:SS` for a playback position. Minutes are not wrapped at the hour and
/// negative or non-finite input reads as zero.
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}
