//! Terminal progress bar for long `step()` calls.

use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Progress of one multi-step call with a moving-average time per step.
#[derive(Clone, Debug)]
pub struct ProgressBar {
    n: usize,
    n_avg: usize,
    n_bars: usize,
    bar_char: char,
    i_step: usize,
    start: Instant,
    prev: Instant,
    total: Duration,
    time_per_step: f64,
    avg_time_per_step: f64,
    eta: Option<f64>,
}

impl ProgressBar {
    /// Steps averaged in the time-per-step estimate.
    pub const N_AVG: usize = 20;

    /// Width of the bar in characters.
    pub const N_BARS: usize = 35;

    /// Bar for a call of `n` steps, timed from now.
    pub fn new(n: usize) -> Self {
        let now = Instant::now();
        Self {
            n: n.max(1),
            n_avg: Self::N_AVG,
            n_bars: Self::N_BARS,
            bar_char: '█',
            i_step: 0,
            start: now,
            prev: now,
            total: Duration::ZERO,
            time_per_step: 0.0,
            avg_time_per_step: 0.0,
            eta: None,
        }
    }

    /// Register the start of step `i_step`.
    pub fn time(&mut self, i_step: usize) {
        let now = Instant::now();
        self.record(i_step, now - self.start, now - self.prev);
        self.prev = now;
    }

    fn record(&mut self, i_step: usize, total: Duration, last: Duration) {
        self.i_step = i_step;
        self.total = total;
        self.time_per_step = last.as_secs_f64();
        self.avg_time_per_step += (self.time_per_step - self.avg_time_per_step) / self.n_avg as f64;
        // The first steps carry one-off setup costs.
        if i_step <= 2 {
            self.avg_time_per_step = self.time_per_step;
        }
        self.eta = (i_step >= self.n_avg)
            .then(|| self.avg_time_per_step * (self.n - i_step) as f64);
    }

    /// Estimated seconds left, once enough steps have been averaged.
    pub fn eta(&self) -> Option<f64> {
        self.eta
    }

    /// The current progress line, without terminal control codes.
    pub fn line(&self) -> String {
        let done = self.i_step + 1;
        let nbars = (done * self.n_bars / self.n).min(self.n_bars);
        let mut line: String = std::iter::repeat(self.bar_char).take(nbars).collect();
        line.extend(std::iter::repeat(' ').take(self.n_bars - nbars));
        line.push_str(&format!(" {done}/{}", self.n));
        match self.eta {
            Some(eta) => line.push_str(&format!(", {} left", hms(eta))),
            None => line.push_str(", calc. ETA..."),
        }
        line.push_str(&format!(", {} ms/step", (self.time_per_step * 1e3) as u64));
        line
    }

    /// Redraw the bar on stderr.
    pub fn print_progress(&self) {
        let mut err = io::stderr().lock();
        // A broken terminal is no reason to stop the run.
        let _ = write!(err, "\r{}\x1b[K", self.line());
        if self.i_step + 1 >= self.n {
            let _ = writeln!(err);
        }
        let _ = err.flush();
    }

    /// Total runtime and mean time per step.
    pub fn summary(&self) -> String {
        let total = self.total.as_secs_f64();
        let avg_ms = (total / self.n as f64 * 1e3) as u64;
        format!(
            "Total time taken: {}\nAverage time per iteration: {avg_ms} ms",
            hms(total)
        )
    }

    /// Log the summary.
    pub fn print_summary(&self) {
        for line in self.summary().lines() {
            log::info!("{line}");
        }
    }
}

/// `H:MM:SS` rendering of a duration in seconds.
fn hms(seconds: f64) -> String {
    let s = seconds.max(0.0) as u64;
    format!("{}:{:02}:{:02}", s / 3600, (s / 60) % 60, s % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn formats_hours_minutes_seconds() {
        assert_eq!(hms(0.0), "0:00:00");
        assert_eq!(hms(61.9), "0:01:01");
        assert_eq!(hms(3723.0), "1:02:03");
    }

    #[test]
    fn eta_waits_for_average() {
        let mut bar = ProgressBar::new(100);
        for i in 0..ProgressBar::N_AVG {
            bar.record(i, ms(10 * (i as u64 + 1)), ms(10));
            assert_eq!(bar.eta(), None);
        }
        bar.record(20, ms(210), ms(10));
        let eta = bar.eta().unwrap();
        assert!((eta - 0.8).abs() < 1e-9, "{eta}");
        assert!(bar.line().contains("0:00:00 left"));
    }

    #[test]
    fn early_steps_reset_average() {
        let mut bar = ProgressBar::new(10);
        bar.record(0, ms(0), ms(5000));
        bar.record(1, ms(5010), ms(10));
        assert!((bar.avg_time_per_step - 0.010).abs() < 1e-12);
        bar.record(3, ms(5030), ms(30));
        let expected = 0.010 + (0.030 - 0.010) / 20.0;
        assert!((bar.avg_time_per_step - expected).abs() < 1e-12);
    }

    #[test]
    fn line_layout() {
        let mut bar = ProgressBar::new(4);
        bar.record(1, ms(20), ms(12));
        let line = bar.line();
        let filled = line.chars().take_while(|&c| c == '█').count();
        assert_eq!(filled, 2 * ProgressBar::N_BARS / 4);
        assert!(line.contains(" 2/4"));
        assert!(line.contains("calc. ETA"));
        assert!(line.ends_with("12 ms/step"));
    }

    #[test]
    fn summary_reports_mean() {
        let mut bar = ProgressBar::new(4);
        bar.record(3, ms(2000), ms(500));
        let s = bar.summary();
        assert!(s.contains("0:00:02"));
        assert!(s.contains("500 ms"));
    }
}
