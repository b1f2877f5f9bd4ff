use crate::core::errors::QuoteSourceError;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub const NO_DATA_GLYPH: &str = "—";
const MAX_DISPLAY_CHARS: usize = 6;
pub const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Updated,
    Closed,
}

/// Market data collaborator. Every method may block; any error is terminal for the worker.
pub trait QuoteSource: Send {
    fn wait_update(&mut self) -> Result<WaitOutcome, QuoteSourceError>;
    fn last_price(&self) -> Result<Option<f64>, QuoteSourceError>;
    fn close(&mut self) -> Result<(), QuoteSourceError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "text", rename_all = "snake_case")]
pub enum QuoteEvent {
    Price(String),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ChannelOptions {
    /// Deliver the no-data glyph when the source has no price yet.
    pub update_when_none: bool,
    pub no_data_glyph: String,
}

impl Default for ChannelOptions {
    fn default() -> Self {
        Self {
            update_when_none: true,
            no_data_glyph: NO_DATA_GLYPH.to_string(),
        }
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Display text for a price: two decimals, trailing zeros and point stripped, at most six
/// characters (rounded integer if that fits, else truncated). Display only.
pub fn format_price(price: Option<f64>, no_data: &str) -> String {
    let Some(p) = price else {
        return no_data.to_string();
    };

    let fixed = format!("{:.2}", p);
    let text = if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed.as_str()
    };
    if text.chars().count() <= MAX_DISPLAY_CHARS {
        return text.to_string();
    }

    if p.is_finite() {
        let rounded = format!("{:.0}", p.round_ties_even());
        if rounded.chars().count() <= MAX_DISPLAY_CHARS {
            return rounded;
        }
    }
    truncate_chars(text, MAX_DISPLAY_CHARS)
}

/// Remembers the last delivered text so each distinct value reaches the UI once.
#[derive(Debug, Default)]
pub struct Deduper {
    last: Option<String>,
}

impl Deduper {
    pub fn accept(&mut self, text: String) -> Option<String> {
        if self.last.as_deref() == Some(text.as_str()) {
            return None;
        }
        self.last = Some(text.clone());
        Some(text)
    }
}

fn run_loop<S, F>(source: &mut S, options: &ChannelOptions, stop: &AtomicBool, deliver: &F)
where
    S: QuoteSource,
    F: Fn(QuoteEvent),
{
    let mut dedup = Deduper::default();
    while !stop.load(Ordering::Acquire) {
        match source.wait_update() {
            Ok(WaitOutcome::Updated) => {}
            Ok(WaitOutcome::Closed) => return,
            Err(e) => {
                deliver(QuoteEvent::Failed(e.to_string()));
                return;
            }
        }
        if stop.load(Ordering::Acquire) {
            return;
        }

        let price = match source.last_price() {
            Ok(price) => price,
            Err(e) => {
                deliver(QuoteEvent::Failed(e.to_string()));
                return;
            }
        };
        if price.is_none() && !options.update_when_none {
            continue;
        }

        if let Some(text) = dedup.accept(format_price(price, &options.no_data_glyph)) {
            deliver(QuoteEvent::Price(text));
        }
    }
}

/// Handle to the polling worker thread.
pub struct QuoteChannel {
    stop: Arc<AtomicBool>,
    done: Receiver<()>,
    handle: Option<JoinHandle<()>>,
}

impl QuoteChannel {
    /// Starts the worker. `deliver` runs on the worker thread and must hand the event to the UI.
    pub fn spawn<S, F>(mut source: S, options: ChannelOptions, deliver: F) -> std::io::Result<Self>
    where
        S: QuoteSource + 'static,
        F: Fn(QuoteEvent) + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let (done_tx, done_rx) = mpsc::channel::<()>();
        let worker_stop = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("quote-channel".to_string())
            .spawn(move || {
                run_loop(&mut source, &options, &worker_stop, &deliver);
                let _ = source.close();
                let _ = done_tx.send(());
            })?;

        Ok(Self {
            stop,
            done: done_rx,
            handle: Some(handle),
        })
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    /// Requests stop and waits up to `timeout`. Returns whether the worker finished; when it
    /// did not, the thread is detached so the caller can carry on exiting.
    pub fn shutdown(mut self, timeout: Duration) -> bool {
        self.request_stop();
        let finished = match self.done.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
            Err(RecvTimeoutError::Timeout) => false,
        };
        if let Some(handle) = self.handle.take() {
            if finished {
                let _ = handle.join();
            }
        }
        finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::time::Instant;

    enum Step {
        Price(Option<f64>),
        Fail(&'static str),
        Close,
        Block(Duration),
    }

    struct ScriptedSource {
        steps: VecDeque<Step>,
        current: Option<f64>,
        closed: Arc<AtomicBool>,
    }

    impl ScriptedSource {
        fn new(steps: Vec<Step>) -> (Self, Arc<AtomicBool>) {
            let closed = Arc::new(AtomicBool::new(false));
            (
                Self {
                    steps: steps.into(),
                    current: None,
                    closed: Arc::clone(&closed),
                },
                closed,
            )
        }
    }

    impl QuoteSource for ScriptedSource {
        fn wait_update(&mut self) -> Result<WaitOutcome, QuoteSourceError> {
            match self.steps.pop_front() {
                Some(Step::Price(p)) => {
                    self.current = p;
                    Ok(WaitOutcome::Updated)
                }
                Some(Step::Fail(msg)) => Err(QuoteSourceError::new(msg)),
                Some(Step::Block(d)) => {
                    thread::sleep(d);
                    Ok(WaitOutcome::Updated)
                }
                Some(Step::Close) | None => Ok(WaitOutcome::Closed),
            }
        }

        fn last_price(&self) -> Result<Option<f64>, QuoteSourceError> {
            Ok(self.current)
        }

        fn close(&mut self) -> Result<(), QuoteSourceError> {
            self.closed.store(true, Ordering::Release);
            Ok(())
        }
    }

    fn collect(steps: Vec<Step>, options: ChannelOptions) -> (Vec<QuoteEvent>, bool) {
        let (source, closed) = ScriptedSource::new(steps);
        let (tx, rx) = mpsc::channel();
        let channel = QuoteChannel::spawn(source, options, move |ev| {
            let _ = tx.send(ev);
        })
        .expect("spawn");
        // the sender is dropped when the worker thread ends on its own
        let events: Vec<QuoteEvent> = rx.iter().collect();
        assert!(channel.shutdown(Duration::from_secs(5)));
        (events, closed.load(Ordering::Acquire))
    }

    #[test]
    fn format_matches_display_rules() {
        assert_eq!(format_price(None, NO_DATA_GLYPH), "—");
        // "12345.6" is seven characters, so the rounded integer is shown
        assert_eq!(format_price(Some(12345.60), NO_DATA_GLYPH), "12346");
        assert_eq!(format_price(Some(2345.6), NO_DATA_GLYPH), "2345.6");
        assert_eq!(format_price(Some(10.0), NO_DATA_GLYPH), "10");
        assert_eq!(format_price(Some(10.001), NO_DATA_GLYPH), "10");
        assert_eq!(format_price(Some(0.5), NO_DATA_GLYPH), "0.5");
        assert_eq!(format_price(Some(68420.25), NO_DATA_GLYPH), "68420");
        assert_eq!(format_price(Some(999999.4), NO_DATA_GLYPH), "999999");
        // half ticks round to even
        assert_eq!(format_price(Some(12344.5), NO_DATA_GLYPH), "12344");
        assert_eq!(format_price(Some(99998.5), NO_DATA_GLYPH), "99998");
        assert_eq!(format_price(Some(12345.5), NO_DATA_GLYPH), "12346");
    }

    #[test]
    fn long_values_never_exceed_six_chars() {
        let text = format_price(Some(1234567.89), NO_DATA_GLYPH);
        assert_eq!(text.chars().count(), 6);
        assert_eq!(text, "123456");
        assert_eq!(format_price(Some(f64::NAN), NO_DATA_GLYPH), "NaN");
        assert_eq!(format_price(Some(f64::INFINITY), NO_DATA_GLYPH), "inf");
    }

    #[test]
    fn identical_text_is_delivered_once() {
        let (events, _) = collect(
            vec![
                Step::Price(Some(10.00)),
                Step::Price(Some(10.00)),
                Step::Price(Some(10.001)),
                Step::Price(Some(10.5)),
            ],
            ChannelOptions::default(),
        );
        assert_eq!(
            events,
            vec![
                QuoteEvent::Price("10".to_string()),
                QuoteEvent::Price("10.5".to_string())
            ]
        );
    }

    #[test]
    fn missing_price_delivers_glyph_unless_disabled() {
        let (events, _) = collect(
            vec![Step::Price(None), Step::Price(Some(1.0))],
            ChannelOptions::default(),
        );
        assert_eq!(
            events,
            vec![
                QuoteEvent::Price("—".to_string()),
                QuoteEvent::Price("1".to_string())
            ]
        );

        let options = ChannelOptions {
            update_when_none: false,
            ..ChannelOptions::default()
        };
        let (events, _) = collect(vec![Step::Price(None), Step::Price(Some(1.0))], options);
        assert_eq!(events, vec![QuoteEvent::Price("1".to_string())]);
    }

    #[test]
    fn failure_is_reported_once_and_ends_the_loop() {
        let (events, closed) = collect(
            vec![
                Step::Price(Some(5.0)),
                Step::Fail("connection reset"),
                Step::Price(Some(6.0)),
            ],
            ChannelOptions::default(),
        );
        assert_eq!(
            events,
            vec![
                QuoteEvent::Price("5".to_string()),
                QuoteEvent::Failed("connection reset".to_string())
            ]
        );
        assert!(closed);
    }

    #[test]
    fn closed_source_ends_silently() {
        let (events, closed) = collect(vec![Step::Close, Step::Price(Some(1.0))], ChannelOptions::default());
        assert!(events.is_empty());
        assert!(closed);
    }

    #[test]
    fn stop_is_observed_after_the_current_wait() {
        let (source, closed) = ScriptedSource::new(
            (0..100)
                .map(|_| Step::Block(Duration::from_millis(20)))
                .collect(),
        );
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let channel = QuoteChannel::spawn(source, ChannelOptions::default(), move |ev| {
            sink.lock().push(ev);
        })
        .expect("spawn");

        thread::sleep(Duration::from_millis(50));
        let started = Instant::now();
        assert!(channel.shutdown(Duration::from_secs(1)));
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(closed.load(Ordering::Acquire));
    }

    #[test]
    fn shutdown_gives_up_after_timeout() {
        let (source, _) = ScriptedSource::new(vec![Step::Block(Duration::from_millis(800))]);
        let channel = QuoteChannel::spawn(source, ChannelOptions::default(), |_| {}).expect("spawn");

        thread::sleep(Duration::from_millis(20));
        let started = Instant::now();
        assert!(!channel.shutdown(Duration::from_millis(100)));
        assert!(started.elapsed() < Duration::from_millis(700));
    }
}
