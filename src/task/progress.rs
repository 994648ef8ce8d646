//! Progress estimation for long-running tasks.
//!
//! Workers count units of work; the display wants a percentage. The
//! conversion lives here so every task reports on the same scale.

/// Sentinel percentage meaning "total unknown, show a busy indicator".
pub const INDETERMINATE: i32 = -1;

/// Convert a raw work count into a percentage of the predicted total.
///
/// Returns a value in `[0, 100]`, or [`INDETERMINATE`] when `predicted` is
/// not a positive number. A negative or overshooting `current` is clamped.
pub fn percent_complete(current: i64, predicted: f64) -> i32 {
    if !(predicted > 0.0) {
        return INDETERMINATE;
    }
    let raw = (100.0 * current as f64 / predicted).round();
    raw.clamp(0.0, 100.0) as i32
}

/// Turns a stream of work counts into a non-decreasing stream of percentages.
///
/// `observe` only yields a value when the displayed percentage would change,
/// which caps a task at 101 determinate notifications no matter how many
/// units of work it performs.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    predicted: f64,
    last: Option<i32>,
}

impl ProgressTracker {
    pub fn new(predicted: f64) -> Self {
        Self {
            predicted,
            last: None,
        }
    }

    /// Replace the predicted total. The high-water mark is kept, so a larger
    /// estimate never makes the display step backwards.
    pub fn set_predicted(&mut self, predicted: f64) {
        self.predicted = predicted;
    }

    pub fn predicted(&self) -> f64 {
        self.predicted
    }

    /// Highest percentage emitted so far.
    pub fn last(&self) -> Option<i32> {
        self.last
    }

    pub fn observe(&mut self, current: i64) -> Option<i32> {
        let percent = percent_complete(current, self.predicted);
        match self.last {
            None => {
                self.last = Some(percent);
                Some(percent)
            }
            // Once a real estimate exists the indeterminate state is only
            // reported again if nothing determinate was ever sent.
            Some(_) if percent == INDETERMINATE => None,
            Some(INDETERMINATE) => {
                self.last = Some(percent);
                Some(percent)
            }
            Some(prev) if percent > prev => {
                self.last = Some(percent);
                Some(percent)
            }
            Some(_) => None,
        }
    }
}
