#![forbid(unsafe_code)]

//! The stage: a scrollable page of typing regions painted with crossterm.
//!
//! Regions live in page coordinates. The [`Viewport`] is the window of the
//! page currently on screen (every row but the status bar); scrolling moves
//! it, and each region's gate sees its rectangle intersected with it.
//!
//! The run loop is cooperative and single-threaded: wait for input at most
//! until the next tick is due, advance every engine by the elapsed wall time
//! (scaled by the speed factor), report visibility, repaint.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::{cursor, queue};
use typist_core::{
    ColorToken, Phase, Rect, TypingConfig, TypingEngine, Viewport, ViewportObserver,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::error::DemoError;
use crate::presets::RegionSpec;
use crate::session::TerminalSession;

/// Upper bound on the input wait, so the cursor blink keeps repainting.
const FRAME: Duration = Duration::from_millis(16);

const STATUS_HINT: &str = " q quit  ↑/↓ PgUp/PgDn scroll  r restart";

/// What the loop should do after an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Keep running.
    Continue,
    /// Leave the loop.
    Quit,
}

/// One animated region of the page.
#[derive(Debug)]
pub struct Region {
    label: String,
    row: u16,
    config: TypingConfig,
    engine: TypingEngine,
    bounds: Rect,
}

impl Region {
    fn new(spec: RegionSpec, viewport: &Viewport) -> Result<Self, DemoError> {
        let RegionSpec { label, row, config } = spec;
        let bounds = text_bounds(row, &config);
        let engine =
            TypingEngine::with_observer(config.clone(), ViewportObserver::new(viewport.clone()))
                .map_err(|source| DemoError::Config {
                    label: label.clone(),
                    source,
                })?;
        Ok(Self {
            label,
            row,
            config,
            engine,
            bounds,
        })
    }

    /// Caption.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Page rectangle covered by the region's text.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// The region's engine.
    #[must_use]
    pub fn engine(&self) -> &TypingEngine {
        &self.engine
    }
}

/// `duration * factor`, saturating at `Duration::MAX` (and at zero for
/// negative or NaN factors).
fn scale(duration: Duration, factor: f64) -> Duration {
    let secs = duration.as_secs_f64() * factor;
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

/// Page rectangle large enough for every sentence plus the cursor.
fn text_bounds(row: u16, config: &TypingConfig) -> Rect {
    let mut width = 1usize;
    let mut height = 1usize;
    for sentence in &config.sequence {
        height = height.max(sentence.split('\n').count());
        for line in sentence.split('\n') {
            width = width.max(line.width() + 1);
        }
    }
    let clamp = |n: usize| u16::try_from(n).unwrap_or(u16::MAX);
    Rect::new(0, row, clamp(width), clamp(height))
}

/// Scrollable page of regions.
#[derive(Debug)]
pub struct Stage {
    regions: Vec<Region>,
    viewport: Viewport,
    page_height: u16,
    speed: f64,
    seed: Option<u64>,
    restarts: u64,
}

impl Stage {
    /// Build the page for a terminal of `cols` x `rows`.
    ///
    /// With `seed`, region `i` draws its variable speeds from `seed + i`.
    pub fn new(
        specs: Vec<RegionSpec>,
        (cols, rows): (u16, u16),
        speed: f64,
        seed: Option<u64>,
    ) -> Result<Self, DemoError> {
        if specs.is_empty() {
            return Err(DemoError::Usage("no regions to show".into()));
        }
        let viewport = Viewport::new(Rect::new(0, 0, cols, rows.saturating_sub(1)));
        let mut regions = Vec::with_capacity(specs.len());
        for (index, mut spec) in specs.into_iter().enumerate() {
            if let Some(base) = seed {
                spec.config.seed = Some(base.wrapping_add(index as u64));
            }
            regions.push(Region::new(spec, &viewport)?);
        }
        let page_height = regions
            .iter()
            .map(|r| r.bounds.bottom())
            .max()
            .unwrap_or(0)
            .saturating_add(1);
        tracing::info!(regions = regions.len(), page_height, speed, "stage ready");
        Ok(Self {
            regions,
            viewport,
            page_height,
            speed,
            seed,
            restarts: 0,
        })
    }

    /// The regions, in page order.
    #[must_use]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// First page row on screen.
    #[must_use]
    pub fn scroll(&self) -> u16 {
        self.viewport.area().y
    }

    /// Rows needed to show every region.
    #[must_use]
    pub fn page_height(&self) -> u16 {
        self.page_height
    }

    fn max_scroll(&self) -> u16 {
        self.page_height.saturating_sub(self.viewport.area().height)
    }

    /// Scroll by `delta` rows, clamped to the page.
    pub fn scroll_by(&mut self, delta: i32) {
        let target = (i32::from(self.scroll()) + delta).clamp(0, i32::from(self.max_scroll()));
        self.viewport
            .scroll_to(u16::try_from(target).unwrap_or(self.scroll()));
    }

    /// Track a terminal resize.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        let top = self.scroll();
        self.viewport
            .set_area(Rect::new(0, top, cols, rows.saturating_sub(1)));
        self.scroll_by(0);
    }

    /// Report every region's rectangle to its visibility gate.
    pub fn observe(&mut self) {
        for region in &mut self.regions {
            if region.engine.observe(region.bounds) {
                tracing::debug!(region = %region.label, "region scrolled into view");
            }
        }
    }

    /// Advance every engine by `elapsed` wall time. Returns ticks fired.
    pub fn advance(&mut self, elapsed: Duration) -> usize {
        let dt = scale(elapsed, self.speed);
        let mut fired = 0;
        for region in &mut self.regions {
            fired += region.engine.advance(dt);
            for event in region.engine.drain_events() {
                tracing::debug!(region = %region.label, ?event, "engine event");
            }
        }
        fired
    }

    /// Wall time until the next tick of any region.
    #[must_use]
    pub fn next_wake(&self) -> Option<Duration> {
        self.regions
            .iter()
            .filter_map(|r| r.engine.time_until_next())
            .min()
            .map(|due| scale(due, self.speed.recip()))
    }

    /// Start every region over. Seeded stages move to a fresh seed.
    pub fn restart(&mut self) -> Result<(), DemoError> {
        self.restarts += 1;
        let stride = self.regions.len() as u64;
        for (index, region) in self.regions.iter_mut().enumerate() {
            match self.seed {
                Some(base) => {
                    let seed = base
                        .wrapping_add(self.restarts.wrapping_mul(stride))
                        .wrapping_add(index as u64);
                    let config = region.config.clone().seed(seed);
                    region
                        .engine
                        .reconfigure(config)
                        .map_err(|source| DemoError::Config {
                            label: region.label.clone(),
                            source,
                        })?;
                }
                None => region.engine.restart(),
            }
        }
        tracing::info!(restarts = self.restarts, "stage restarted");
        Ok(())
    }

    /// Apply a key press.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<Control, DemoError> {
        if key.kind != KeyEventKind::Press {
            return Ok(Control::Continue);
        }
        let page = i32::from(self.viewport.area().height.saturating_sub(1).max(1));
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(Control::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Ok(Control::Quit);
            }
            KeyCode::Char('r') => self.restart()?,
            KeyCode::Up | KeyCode::Char('k') => self.scroll_by(-1),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_by(1),
            KeyCode::PageUp => self.scroll_by(-page),
            KeyCode::PageDown | KeyCode::Char(' ') => self.scroll_by(page),
            KeyCode::Home => self.scroll_by(-i32::from(self.page_height)),
            KeyCode::End => self.scroll_by(i32::from(self.page_height)),
            _ => {}
        }
        Ok(Control::Continue)
    }

    /// Paint the visible part of the page and the status bar.
    pub fn paint(&self, out: &mut impl Write) -> io::Result<()> {
        let area = self.viewport.area();
        let cols = usize::from(area.width);

        for y in 0..=area.height {
            queue!(out, cursor::MoveTo(0, y), Clear(ClearType::CurrentLine))?;
        }

        for region in &self.regions {
            if region.row > 0
                && let Some(y) = screen_row(area, region.row - 1)
            {
                queue!(
                    out,
                    cursor::MoveTo(0, y),
                    SetForegroundColor(Color::DarkGrey),
                    Print(clip(&region.label.to_uppercase(), cols)),
                    ResetColor
                )?;
            }

            let snap = region.engine.snapshot();
            let color = snap.color.token().and_then(terminal_color);
            let mut lines: Vec<String> = snap.text.split('\n').map(str::to_owned).collect();
            if snap.cursor_visible
                && region.engine.cursor_blink_on()
                && let Some(last) = lines.last_mut()
            {
                last.push(snap.cursor_char);
            }

            for (offset, line) in lines.iter().enumerate() {
                let Some(page_row) = u16::try_from(offset)
                    .ok()
                    .and_then(|o| region.row.checked_add(o))
                else {
                    break;
                };
                let Some(y) = screen_row(area, page_row) else {
                    continue;
                };
                queue!(out, cursor::MoveTo(0, y))?;
                if let Some(color) = color {
                    queue!(out, SetForegroundColor(color))?;
                }
                queue!(out, Print(clip(line, cols)), ResetColor)?;
            }
        }

        let status = format!(
            " {} |{STATUS_HINT} | rows {}-{} of {}",
            self.phase_summary(),
            area.y,
            area.bottom().min(self.page_height),
            self.page_height
        );
        queue!(
            out,
            cursor::MoveTo(0, area.height),
            SetAttribute(Attribute::Reverse),
            Print(clip(&status, cols)),
            SetAttribute(Attribute::Reset)
        )?;
        out.flush()
    }

    fn phase_summary(&self) -> String {
        let done = self.regions.iter().filter(|r| r.engine.is_complete()).count();
        let waiting = self
            .regions
            .iter()
            .filter(|r| r.engine.phase() == Phase::AwaitingVisibility)
            .count();
        format!(
            "{} running, {waiting} waiting, {done} done",
            self.regions.len() - done - waiting
        )
    }
}

fn screen_row(area: Rect, page_row: u16) -> Option<u16> {
    (page_row >= area.y && page_row < area.bottom()).then(|| page_row - area.y)
}

fn terminal_color(token: &ColorToken) -> Option<Color> {
    token.to_rgb().map(|rgb| Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    })
}

/// Longest prefix of `line` that fits in `width` columns.
fn clip(line: &str, width: usize) -> &str {
    let mut used = 0;
    for (idx, ch) in line.char_indices() {
        used += ch.width().unwrap_or(0);
        if used > width {
            return &line[..idx];
        }
    }
    line
}

/// Drive `stage` until the user quits or `exit_after` elapses.
pub fn run(
    stage: &mut Stage,
    session: &TerminalSession,
    exit_after: Option<Duration>,
) -> Result<(), DemoError> {
    let mut out = io::stdout();
    let started = Instant::now();
    let mut last = started;

    stage.observe();
    stage.paint(&mut out)?;

    loop {
        let wait = stage.next_wake().map_or(FRAME, |due| due.min(FRAME));
        if session.poll_event(wait)? {
            match session.read_event()? {
                Event::Key(key) => {
                    if stage.handle_key(key)? == Control::Quit {
                        tracing::info!("quit requested");
                        break;
                    }
                }
                Event::Resize(cols, rows) => stage.resize(cols, rows),
                _ => {}
            }
        }

        let now = Instant::now();
        stage.advance(now.duration_since(last));
        last = now;
        stage.observe();
        stage.paint(&mut out)?;

        if let Some(limit) = exit_after
            && started.elapsed() >= limit
        {
            tracing::info!(?limit, "exit-after elapsed");
            break;
        }
    }
    Ok(())
}
