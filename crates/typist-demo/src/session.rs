#![forbid(unsafe_code)]

//! Terminal session lifecycle guard.
//!
//! RAII ownership of raw mode, the alternate screen and the hidden cursor.
//!
//! # Lifecycle Guarantees
//!
//! 1. **Drop restores previous state** - enabled modes are disabled in reverse
//!    order when the [`TerminalSession`] is dropped.
//! 2. **Panic safety** - a panic hook restores the terminal before the
//!    default hook prints the message.
//! 3. **Signals** - on Unix, SIGINT and SIGTERM restore the terminal and exit
//!    with `128 + signal`.
//!
//! # Cleanup Order
//!
//! 1. Show cursor
//! 2. Leave alternate screen (if enabled)
//! 3. Exit raw mode
//! 4. Flush stdout

use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Duration;

use crossterm::event::Event;

#[cfg(unix)]
use signal_hook::consts::signal::{SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

/// Owns the terminal while the demo runs.
#[derive(Debug)]
pub struct TerminalSession {
    alternate_screen_enabled: bool,
    cursor_hidden: bool,
    #[cfg(unix)]
    signal_guard: Option<SignalGuard>,
}

impl TerminalSession {
    /// Enter raw mode, switch to the alternate screen and hide the cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode cannot be enabled or the escape sequences
    /// cannot be written.
    pub fn new() -> io::Result<Self> {
        install_panic_hook();

        crossterm::terminal::enable_raw_mode()?;
        tracing::info!("terminal raw mode enabled");

        let mut session = Self {
            alternate_screen_enabled: false,
            cursor_hidden: false,
            #[cfg(unix)]
            signal_guard: Some(SignalGuard::new()?),
        };

        let mut stdout = io::stdout();
        crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
        session.alternate_screen_enabled = true;
        tracing::info!("alternate screen enabled");

        crossterm::execute!(stdout, crossterm::cursor::Hide)?;
        session.cursor_hidden = true;

        Ok(session)
    }

    /// Current terminal size (columns, rows).
    pub fn size(&self) -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }

    /// Wait up to `timeout` for input. Returns whether an event is ready.
    pub fn poll_event(&self, timeout: Duration) -> io::Result<bool> {
        crossterm::event::poll(timeout)
    }

    /// Read the next event (blocking until available).
    pub fn read_event(&self) -> io::Result<Event> {
        crossterm::event::read()
    }

    fn cleanup(&mut self) {
        #[cfg(unix)]
        let _ = self.signal_guard.take();

        let mut stdout = io::stdout();

        if self.cursor_hidden {
            let _ = crossterm::execute!(stdout, crossterm::cursor::Show);
            self.cursor_hidden = false;
        }

        if self.alternate_screen_enabled {
            let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
            self.alternate_screen_enabled = false;
            tracing::info!("alternate screen disabled");
        }

        let _ = crossterm::terminal::disable_raw_mode();
        tracing::info!("terminal raw mode disabled");

        let _ = stdout.flush();
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            best_effort_cleanup();
            previous(info);
        }));
    });
}

fn best_effort_cleanup() {
    let mut stdout = io::stdout();
    let _ = crossterm::execute!(
        stdout,
        crossterm::style::ResetColor,
        crossterm::cursor::Show,
        crossterm::terminal::LeaveAlternateScreen
    );
    let _ = crossterm::terminal::disable_raw_mode();
    let _ = stdout.flush();
}

#[cfg(unix)]
#[derive(Debug)]
struct SignalGuard {
    handle: signal_hook::iterator::Handle,
    thread: Option<std::thread::JoinHandle<()>>,
}

#[cfg(unix)]
impl SignalGuard {
    fn new() -> io::Result<Self> {
        let mut signals = Signals::new([SIGINT, SIGTERM]).map_err(io::Error::other)?;
        let handle = signals.handle();
        let thread = std::thread::spawn(move || {
            if let Some(signal) = signals.forever().next() {
                tracing::warn!(signal, "termination signal received, cleaning up");
                best_effort_cleanup();
                std::process::exit(128 + signal);
            }
        });
        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }
}

#[cfg(unix)]
impl Drop for SignalGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
