use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CEvent, KeyEvent};

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Tick,
}

/// Background thread producing a tick every `tick_rate_ms` plus any key
/// presses in between. Stopped on `cancel` or drop; no tick is delivered
/// after that.
pub struct EventHandler {
    rx: mpsc::Receiver<Event>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl EventHandler {
    pub fn new(tick_rate_ms: u64) -> Self {
        Self::spawn(tick_rate_ms, true)
    }

    fn spawn(tick_rate_ms: u64, read_keys: bool) -> Self {
        let (tx, rx) = mpsc::channel();
        let tick_rate = Duration::from_millis(tick_rate_ms);
        let stop = Arc::new(AtomicBool::new(false));
        let stopped = Arc::clone(&stop);

        let handle = thread::spawn(move || {
            let mut last_tick = Instant::now();
            while !stopped.load(Ordering::Relaxed) {
                // short slices so cancel is noticed promptly
                let timeout = tick_rate
                    .checked_sub(last_tick.elapsed())
                    .unwrap_or(Duration::ZERO)
                    .min(Duration::from_millis(50));

                if read_keys {
                    if event::poll(timeout).unwrap_or(false) {
                        match event::read() {
                            Ok(CEvent::Key(key)) => {
                                if tx.send(Event::Key(key)).is_err() {
                                    break;
                                }
                            }
                            Ok(_) => {}
                            Err(_) => break,
                        }
                    }
                } else {
                    thread::sleep(timeout);
                }

                if last_tick.elapsed() >= tick_rate {
                    if stopped.load(Ordering::Relaxed) || tx.send(Event::Tick).is_err() {
                        break;
                    }
                    last_tick = Instant::now();
                }
            }
            log::debug!("Event thread stopped");
        });

        Self {
            rx,
            stop,
            handle: Some(handle),
        }
    }

    pub fn next(&self) -> Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }

    /// Stop the thread and wait for it. Pending events are discarded.
    pub fn cancel(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        while self.rx.try_recv().is_ok() {}
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        self.cancel();
    }
}
