//! Interactive terminal preview.
//!
//! Hosts the motion components in a terminal: a scrollable page with the
//! typewriter hero line cycling through its texts and the reading-progress bar
//! along the top row. Wall-clock time drives the [`Scheduler`]; terminal
//! geometry drives the [`Environment`] at [`PX_PER_COLUMN`] logical pixels per
//! column and [`PX_PER_ROW`] per row.

use crate::env::Environment;
use crate::model::{Cadence, ColorScheme, Viewport};
use crate::progress::{ProgressColors, ProgressIndicator};
use crate::scroll::{ScrollObserver, DEFAULT_SCROLL_IDLE};
use crate::timer::Scheduler;
use crate::typewriter::{Typewriter, TypewriterProps, TypewriterState};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Paragraph, Widget},
    Frame, Terminal,
};
use std::cell::Cell;
use std::io::{self, Stdout};
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::hero::HeroLine;
use super::progress_bar::ProgressBarWidget;

/// Logical pixels per terminal column.
pub const PX_PER_COLUMN: f64 = 8.0;

/// Logical pixels per terminal row.
pub const PX_PER_ROW: f64 = 16.0;

/// How long a completed headline stays before the next one starts.
pub const HOLD_AFTER_COMPLETE: Duration = Duration::from_millis(2000);

/// Event poll timeout; roughly one frame at 60 Hz.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Rows of body copy below the hero line.
const BODY_ROWS: usize = 120;

/// Rows above the body: bar, blank, hero, blank.
const HEADER_ROWS: usize = 4;

/// Headlines shown when none are given.
pub const DEFAULT_TEXTS: [&str; 3] = [
    "Hi, I build things for the web.",
    "Backend, frontend, and the glue in between.",
    "Scroll down to read more.",
];

/// Preview settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewOptions {
    /// Headlines to cycle through. Empty entries are skipped; none at all
    /// means [`DEFAULT_TEXTS`].
    pub texts: Vec<String>,
    /// Per-character reveal delay.
    pub cadence: Cadence,
    /// Scroll idle period.
    pub scroll_idle: Duration,
    /// Progress fill colors.
    pub colors: ProgressColors,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            texts: Vec::new(),
            cadence: Cadence::default(),
            scroll_idle: DEFAULT_SCROLL_IDLE,
            colors: ProgressColors::default(),
        }
    }
}

/// Viewport for a terminal of `columns` x `rows` cells.
pub fn viewport_for(columns: u16, rows: u16) -> Viewport {
    Viewport::new(
        f64::from(columns) * PX_PER_COLUMN,
        f64::from(rows) * PX_PER_ROW,
    )
}

fn document_height() -> f64 {
    (HEADER_ROWS + BODY_ROWS) as f64 * PX_PER_ROW
}

/// Preview application.
///
/// Generic over the backend so tests can drive it with `TestBackend`.
pub struct PreviewApp<B: Backend> {
    terminal: Terminal<B>,
    env: Environment,
    scheduler: Scheduler,
    observer: ScrollObserver,
    indicator: ProgressIndicator,
    typewriter: Typewriter,
    texts: Vec<String>,
    current: usize,
    completed_at: Rc<Cell<Option<Duration>>>,
}

impl PreviewApp<CrosstermBackend<Stdout>> {
    /// Put the terminal in raw mode on the alternate screen and mount the
    /// components.
    ///
    /// Raw mode is undone if any later setup step fails.
    pub fn new(options: PreviewOptions) -> io::Result<Self> {
        enable_raw_mode()?;
        restore_on_error(
            || {
                let mut stdout = io::stdout();
                stdout.execute(EnterAlternateScreen)?;
                let backend = CrosstermBackend::new(stdout);
                let terminal = Terminal::new(backend)?;
                Self::with_terminal(terminal, options)
            },
            restore_terminal,
        )
    }

    /// Run until the user quits, driving the scheduler from the wall clock.
    pub fn run(&mut self) -> io::Result<()> {
        self.draw()?;
        let mut last = Instant::now();

        loop {
            let mut dirty = false;
            if event::poll(FRAME_INTERVAL)? {
                match event::read()? {
                    Event::Key(key) => {
                        if self.handle_key(key) {
                            return Ok(());
                        }
                        dirty = true;
                    }
                    Event::Resize(columns, rows) => {
                        self.handle_resize(columns, rows);
                        dirty = true;
                    }
                    _ => {}
                }
            }

            let now = Instant::now();
            if self.tick(now.duration_since(last)) {
                dirty = true;
            }
            last = now;

            if dirty {
                self.draw()?;
            }
        }
    }
}

impl<B: Backend> PreviewApp<B> {
    /// Mount the components against an existing terminal.
    pub fn with_terminal(terminal: Terminal<B>, options: PreviewOptions) -> io::Result<Self> {
        let size = terminal.size()?;
        let env = Environment::new(viewport_for(size.width, size.height));
        env.document_height.set(document_height());

        let scheduler = Scheduler::new();
        let observer = ScrollObserver::attach(&env, &scheduler, options.scroll_idle);
        let indicator = ProgressIndicator::mount(&env.color_scheme, options.colors);

        let mut texts: Vec<String> = options.texts.into_iter().filter(|t| !t.is_empty()).collect();
        if texts.is_empty() {
            texts = DEFAULT_TEXTS.iter().map(|t| (*t).to_string()).collect();
        }

        let completed_at = Rc::new(Cell::new(None));
        let on_complete = {
            let completed_at = Rc::clone(&completed_at);
            let clock = scheduler.clone();
            move || completed_at.set(Some(clock.now()))
        };
        let first = texts.first().cloned().unwrap_or_default();
        let props = TypewriterProps::new(first)
            .with_cadence(options.cadence)
            .on_complete(on_complete);
        let typewriter = Typewriter::mount(props, &env.reduced_motion, &scheduler);

        info!(
            texts = texts.len(),
            cadence = %options.cadence,
            columns = size.width,
            rows = size.height,
            "preview started"
        );

        Ok(Self {
            terminal,
            env,
            scheduler,
            observer,
            indicator,
            typewriter,
            texts,
            current: 0,
            completed_at,
        })
    }

    /// Shared environment signals.
    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Virtual clock driving the components.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// The hero typewriter.
    pub fn typewriter(&self) -> &Typewriter {
        &self.typewriter
    }

    /// The scroll observer.
    pub fn observer(&self) -> &ScrollObserver {
        &self.observer
    }

    /// Index of the headline being shown.
    pub fn current_text(&self) -> usize {
        self.current
    }

    /// Backend, for inspecting test output.
    pub fn backend(&self) -> &B {
        self.terminal.backend()
    }

    /// Advance time by `elapsed`. Returns whether anything changed.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        let fired = self.scheduler.advance(elapsed);
        let mut changed = fired > 0;
        if let Some(done) = self.completed_at.get() {
            if self.scheduler.now() >= done + HOLD_AFTER_COMPLETE {
                self.next_text();
                changed = true;
            }
        }
        changed
    }

    /// Switch to the next headline, wrapping around.
    pub fn next_text(&mut self) {
        self.completed_at.set(None);
        if self.texts.is_empty() {
            return;
        }
        self.current = (self.current + 1) % self.texts.len();
        debug!(index = self.current, "next headline");
        let next = self.texts[self.current].clone();
        // Setting the same text is a no-op, so blank it to replay.
        if next == self.typewriter.text() {
            self.typewriter.set_text("");
            self.completed_at.set(None);
        }
        self.typewriter.set_text(next);
    }

    /// Apply a key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind == KeyEventKind::Release {
            return false;
        }
        let page = self.env.viewport.get().height;
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Down | KeyCode::Char('j') => self.env.scroll_by(PX_PER_ROW),
            KeyCode::Up | KeyCode::Char('k') => self.env.scroll_by(-PX_PER_ROW),
            KeyCode::PageDown | KeyCode::Char(' ') => self.env.scroll_by(page),
            KeyCode::PageUp => self.env.scroll_by(-page),
            KeyCode::Home => self.env.scroll_to(0.0),
            KeyCode::End => {
                let max = self.env.scroll_metrics().max_offset();
                self.env.scroll_to(max);
            }
            KeyCode::Char('n') => self.next_text(),
            KeyCode::Char('m') => {
                let reduced = !self.env.reduced_motion.get();
                debug!(reduced, "reduced motion toggled");
                self.env.reduced_motion.set(reduced);
            }
            KeyCode::Char('c') => {
                let scheme = self.env.color_scheme.get().toggled();
                debug!(?scheme, "color scheme toggled");
                self.env.color_scheme.set(scheme);
            }
            _ => {}
        }
        false
    }

    /// Push a new terminal size into the environment.
    pub fn handle_resize(&mut self, columns: u16, rows: u16) {
        self.env.viewport.set(viewport_for(columns, rows));
        // Keep the offset reachable after the viewport grows.
        let offset = self.env.scroll_offset.get();
        self.env.scroll_to(offset);
    }

    /// Render one frame.
    pub fn draw(&mut self) -> io::Result<()> {
        let viewport = self.env.viewport.get();
        let scroll = self.observer.state();
        let bar = self.indicator.render(viewport.width, &scroll);
        let hero = self.typewriter.state();
        let offset_rows = (self.env.scroll_offset.get() / PX_PER_ROW).round() as usize;
        let status = status_line(
            scroll.progress,
            scroll.is_scrolling,
            self.env.reduced_motion.get(),
            self.indicator.scheme(),
        );

        self.terminal.draw(|frame: &mut Frame| {
            let area = frame.area();
            let buf = frame.buffer_mut();
            render_page(area, buf, offset_rows, &hero);
            if let Some(bar) = bar.as_ref() {
                ProgressBarWidget::new(bar).render(Rect { height: 1, ..area }, buf);
            }
            if area.height > 1 {
                let status_area = Rect {
                    y: area.bottom() - 1,
                    height: 1,
                    ..area
                };
                Paragraph::new(status)
                    .style(Style::default().fg(Color::Black).bg(Color::Gray))
                    .render(status_area, buf);
            }
        })?;
        Ok(())
    }
}

/// Draw the page rows visible at `offset_rows`.
fn render_page(
    area: Rect,
    buf: &mut Buffer,
    offset_rows: usize,
    hero: &TypewriterState,
) {
    let hero_row = 2;
    for screen_row in 0..area.height {
        let page_row = offset_rows + usize::from(screen_row);
        let row_area = Rect {
            y: area.y + screen_row,
            height: 1,
            ..area
        };
        if page_row == hero_row {
            HeroLine::new(hero).render(row_area, buf);
        } else if page_row >= HEADER_ROWS && page_row < HEADER_ROWS + BODY_ROWS {
            Line::styled(
                body_line(page_row - HEADER_ROWS),
                Style::default().fg(Color::Gray),
            )
            .render(row_area, buf);
        }
    }
}

fn body_line(index: usize) -> String {
    if index % 12 == 0 {
        format!("  Section {}", index / 12 + 1)
    } else {
        format!("  {:>3} · lorem ipsum dolor sit amet, consectetur adipiscing elit", index)
    }
}

fn status_line(progress: f64, scrolling: bool, reduced_motion: bool, scheme: ColorScheme) -> Line<'static> {
    let motion = if reduced_motion { "reduced" } else { "full" };
    let scheme = match scheme {
        ColorScheme::Light => "light",
        ColorScheme::Dark => "dark",
    };
    let marker = if scrolling { "*" } else { " " };
    Line::from(format!(
        " {:>3}%{marker} motion:{motion} scheme:{scheme}  arrows/PgUp/PgDn scroll  n next  m motion  c scheme  q quit",
        (progress * 100.0).round() as u32
    ))
    .style(Style::default().add_modifier(Modifier::BOLD))
}

/// Run the preview until the user quits, restoring the terminal afterwards.
pub fn run(options: PreviewOptions) -> io::Result<()> {
    let mut app = PreviewApp::new(options)?;
    let result = app.run();
    drop(app);
    restore_terminal()?;
    result
}

/// Run `setup`; on failure run `restore` before handing the error back.
///
/// The setup error wins over a restore error.
fn restore_on_error<T>(
    setup: impl FnOnce() -> io::Result<T>,
    restore: impl FnOnce() -> io::Result<()>,
) -> io::Result<T> {
    setup().or_else(|err| {
        if let Err(restore_err) = restore() {
            warn!(error = %restore_err, "terminal restore failed after setup error");
        }
        Err(err)
    })
}

/// Restore terminal to normal state.
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
#[path = "preview_tests.rs"]
mod tests;
