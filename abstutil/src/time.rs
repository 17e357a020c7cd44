use instant::Instant;

use crate::{prettyprint_usize, PROGRESS_FREQUENCY_SECONDS};

pub fn elapsed_seconds(since: Instant) -> f64 {
    let dt = since.elapsed();
    (dt.as_secs() as f64) + (f64::from(dt.subsec_nanos()) * 1e-9)
}

pub fn prettyprint_time(seconds: f64) -> String {
    format!("{:.4}s", seconds)
}

struct Progress {
    label: String,
    processed_items: usize,
    total_items: usize,
    started_at: Instant,
    last_printed_at: Instant,
}

impl Progress {
    fn new(label: &str, total_items: usize) -> Progress {
        Progress {
            label: label.to_string(),
            processed_items: 0,
            total_items,
            started_at: Instant::now(),
            last_printed_at: Instant::now(),
        }
    }

    // Returns when done
    fn next(&mut self, quiet: bool) -> Option<(f64, String)> {
        self.processed_items += 1;
        if self.processed_items > self.total_items {
            panic!(
                "{} is too few items for {} progress",
                prettyprint_usize(self.total_items),
                self.label
            );
        }

        if self.processed_items == self.total_items {
            let elapsed = elapsed_seconds(self.started_at);
            let line = format!(
                "{} ({})... {}",
                self.label,
                prettyprint_usize(self.total_items),
                prettyprint_time(elapsed)
            );
            if !quiet {
                info!("{}", line);
            }
            return Some((elapsed, line));
        } else if elapsed_seconds(self.last_printed_at) >= PROGRESS_FREQUENCY_SECONDS {
            self.last_printed_at = Instant::now();
            if !quiet {
                debug!(
                    "{}: {}/{}... {}",
                    self.label,
                    prettyprint_usize(self.processed_items),
                    prettyprint_usize(self.total_items),
                    prettyprint_time(elapsed_seconds(self.started_at))
                );
            }
        }
        None
    }
}

struct TimerSpan {
    name: String,
    started_at: Instant,
}

enum StackEntry {
    TimerSpan(TimerSpan),
    Progress(Progress),
}

/// Hierarchial magic. Nest named spans with `start` and `stop`, and report progress over long
/// loops with `start_iter` and `next`. Everything is reported through `log`; the summary of every
/// span is repeated at the end.
pub struct Timer {
    results: Vec<String>,
    stack: Vec<StackEntry>,
    outermost_name: String,
    quiet: bool,
}

impl Timer {
    pub fn new(name: &str) -> Timer {
        let mut t = Timer {
            results: Vec::new(),
            stack: Vec::new(),
            outermost_name: name.to_string(),
            quiet: false,
        };
        t.start(name);
        t
    }

    /// Doesn't log anything. Useful for tests and callers that don't care.
    pub fn throwaway() -> Timer {
        Timer {
            results: Vec::new(),
            stack: Vec::new(),
            outermost_name: "throwaway".to_string(),
            quiet: true,
        }
    }

    pub fn start(&mut self, name: &str) {
        if !self.quiet {
            info!("{}...", name);
        }
        self.stack.push(StackEntry::TimerSpan(TimerSpan {
            name: name.to_string(),
            started_at: Instant::now(),
        }));
    }

    pub fn stop(&mut self, name: &str) {
        let span = match self.stack.pop() {
            Some(StackEntry::TimerSpan(s)) => s,
            Some(StackEntry::Progress(p)) => {
                panic!("stop({}) while Progress({}) is top of the stack", name, p.label)
            }
            None => panic!("stop({}) on an empty Timer", name),
        };
        assert_eq!(span.name, name);
        let elapsed = elapsed_seconds(span.started_at);
        let line = format!("{} took {}", name, prettyprint_time(elapsed));
        self.add_result(line.clone());
        if !self.quiet {
            info!("{}", line);
        }
    }

    pub fn start_iter(&mut self, name: &str, total_items: usize) {
        if total_items == 0 {
            return;
        }
        if let Some(StackEntry::Progress(p)) = self.stack.last() {
            panic!(
                "Can't start_iter({}) while Progress({}) is top of the stack",
                name, p.label
            );
        }

        self.stack
            .push(StackEntry::Progress(Progress::new(name, total_items)));
    }

    pub fn next(&mut self) {
        let quiet = self.quiet;
        let maybe_result =
            if let Some(StackEntry::Progress(ref mut progress)) = self.stack.last_mut() {
                progress.next(quiet)
            } else {
                panic!("Can't next() while a TimerSpan is top of the stack");
            };
        if let Some((_, result)) = maybe_result {
            self.stack.pop();
            self.add_result(result);
        }
    }

    fn add_result(&mut self, line: String) {
        let padding = "  ".repeat(self.stack.len());
        self.results.push(format!("{}- {}", padding, line));
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        if self.quiet {
            return;
        }

        // Close the outermost span, if nobody else did
        let close_outermost = matches!(
            self.stack.as_slice(),
            [StackEntry::TimerSpan(s)] if s.name == self.outermost_name
        );
        if close_outermost {
            let name = self.outermost_name.clone();
            self.stop(&name);
        }

        debug!("{} summary:", self.outermost_name);
        for line in &self.results {
            debug!("{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_spans_and_progress() {
        let mut timer = Timer::throwaway();
        timer.start("outer");
        timer.start_iter("loop", 3);
        for _ in 0..3 {
            timer.next();
        }
        timer.stop("outer");
        assert_eq!(timer.results.len(), 2);
        assert!(timer.results[0].contains("loop (3)"));
        assert!(timer.results[1].contains("outer took"));
    }

    #[test]
    fn empty_iter_is_a_no_op() {
        let mut timer = Timer::throwaway();
        timer.start_iter("nothing", 0);
        timer.start("after");
        timer.stop("after");
    }

    #[test]
    #[should_panic]
    fn mismatched_stop() {
        let mut timer = Timer::throwaway();
        timer.start("a");
        timer.stop("b");
    }
}
