use std::time::{Duration, SystemTime};

/// Progress line for a dump run: page and revision rates, and an ETA based
/// on how much of the input has been read.
#[derive(Clone, Debug)]
pub struct Progress {
    /// Input size in bytes, 0 if unknown
    pub total: u64,
    pub start: SystemTime,
    pub window_length: Duration,
    pub window_start: SystemTime,
    pub window_pages: u64,
    pub window_revisions: u64,
}

impl Progress {
    pub fn new(total: u64, now: SystemTime) -> Self {
        Self {
            total,
            start: now,
            window_length: Duration::from_secs(10),
            window_start: now,
            window_pages: 0,
            window_revisions: 0,
        }
    }

    pub fn progress(&mut self, pages: u64, revisions: u64, position: u64, now: SystemTime) -> String {
        let elapsed = now.duration_since(self.start).unwrap_or_default();
        let window_elapsed = now.duration_since(self.window_start).unwrap_or_default();

        let page_rate_avg = rate(pages, elapsed);
        let page_rate = rate(pages.saturating_sub(self.window_pages), window_elapsed);
        let revision_rate_avg = rate(revisions, elapsed);
        let revision_rate = rate(revisions.saturating_sub(self.window_revisions), window_elapsed);

        let eta = match eta_secs(self.total, position, elapsed) {
            Some(secs) => format!(
                "{:.2}% of input, ETA {:02}:{:02} mins",
                100.0 * position.min(self.total) as f64 / self.total as f64,
                (secs / 60.0).floor() as u64,
                (secs % 60.0).floor() as u64
            ),
            None => "ETA unknown".to_string(),
        };

        let ret = format!(
            "{} pages ({:.2}|{:.2}/sec all|curr), {} revs ({:.2}|{:.2}/sec all|curr), {}",
            pages, page_rate_avg, page_rate, revisions, revision_rate_avg, revision_rate, eta,
        );

        if window_elapsed > self.window_length {
            self.window_start = now;
            self.window_pages = pages;
            self.window_revisions = revisions;
        }

        ret
    }
}

fn rate(count: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        count as f64 / secs
    } else {
        0.0
    }
}

// Seconds left, extrapolating from bytes read so far
fn eta_secs(total: u64, position: u64, elapsed: Duration) -> Option<f64> {
    if total == 0 || position == 0 {
        return None;
    }
    let byte_rate = rate(position, elapsed);
    if byte_rate > 0.0 {
        Some(total.saturating_sub(position) as f64 / byte_rate)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_line() {
        let start = SystemTime::UNIX_EPOCH;
        let mut progress = Progress::new(1000, start);

        let line = progress.progress(10, 20, 250, start + Duration::from_secs(5));
        assert_eq!(
            line,
            "10 pages (2.00|2.00/sec all|curr), 20 revs (4.00|4.00/sec all|curr), \
             25.00% of input, ETA 00:15 mins"
        );
    }

    #[test]
    fn test_window_resets() {
        let start = SystemTime::UNIX_EPOCH;
        let mut progress = Progress::new(0, start);

        progress.progress(100, 100, 0, start + Duration::from_secs(20));
        let line = progress.progress(110, 130, 0, start + Duration::from_secs(30));
        assert_eq!(
            line,
            "110 pages (3.67|1.00/sec all|curr), 130 revs (4.33|3.00/sec all|curr), ETA unknown"
        );
    }

    #[test]
    fn test_no_time_elapsed() {
        let start = SystemTime::UNIX_EPOCH;
        let mut progress = Progress::new(100, start);
        let line = progress.progress(1, 1, 10, start);
        assert!(line.starts_with("1 pages (0.00|0.00/sec all|curr)"));
        assert!(line.ends_with("ETA unknown"));
    }
}
