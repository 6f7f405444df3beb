use std::{future, io, path::PathBuf, thread, time::Duration};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame, Terminal,
};
use tidewatch_core::{LogFeed, Snapshot, TargetView, Tracker};
use tokio::{
    sync::mpsc,
    time::{self, Interval, MissedTickBehavior},
};
use tracing::{debug, error, info};

use crate::{clock_font, host::TerminalHost};

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    spectral: Color,
    muted: Color,
    highlight_bg: Color,
    highlight_fg: Color,
    light_tug: Color,
    medium_tug: Color,
    heavy_tug: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            spectral: Color::Magenta,
            muted: Color::DarkGray,
            highlight_bg: Color::Yellow,
            highlight_fg: Color::Black,
            light_tug: Color::Green,
            medium_tug: Color::Yellow,
            heavy_tug: Color::Red,
        }
    }
}

impl Theme {
    fn tug(&self, tug: u8) -> Color {
        match tug {
            1 => self.light_tug,
            2 => self.medium_tug,
            _ => self.heavy_tug,
        }
    }
}

/// Timer frame period, and how long the input thread waits per poll.
#[derive(Debug, Clone, Copy)]
pub struct Cadence {
    pub frame: Duration,
    pub idle: Duration,
}

/// Terminal shell around the session tracker.
pub struct TidewatchApp {
    tracker: Tracker<TerminalHost>,
    cadence: Cadence,
    log_path: Option<PathBuf>,
    status: String,
    theme: Theme,
    should_quit: bool,
    needs_redraw: bool,
}

impl TidewatchApp {
    pub fn new(
        tracker: Tracker<TerminalHost>,
        cadence: Cadence,
        log_path: Option<PathBuf>,
    ) -> Self {
        let status = match &log_path {
            Some(path) => format!("Following {}", path.display()),
            None => "No network log configured; set log_path or pass --log".to_string(),
        };
        Self {
            tracker,
            cadence,
            log_path,
            status,
            theme: Theme::default(),
            should_quit: false,
            needs_redraw: true,
        }
    }

    pub async fn run(&mut self, feed: Option<mpsc::Receiver<LogFeed>>) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let result = self.event_loop(&mut terminal, feed).await;
        restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        mut feed: Option<mpsc::Receiver<LogFeed>>,
    ) -> Result<()> {
        let (event_tx, mut event_rx) = mpsc::channel::<Event>(128);
        spawn_input_thread(event_tx, self.cadence.idle);
        let mut frames = frame_interval(self.cadence.frame);

        loop {
            let published = self.tracker.host_mut().take_dirty();
            if published || self.needs_redraw {
                terminal.draw(|frame| self.draw(frame))?;
                self.needs_redraw = false;
            }
            if self.should_quit {
                break;
            }
            if !self.step(&mut event_rx, &mut feed, &mut frames).await {
                break;
            }
        }

        Ok(())
    }

    /// Wait for the next input, log feed item or due frame and apply it.
    /// Returns `false` once the input channel is gone.
    async fn step(
        &mut self,
        events: &mut mpsc::Receiver<Event>,
        feed: &mut Option<mpsc::Receiver<LogFeed>>,
        frames: &mut Interval,
    ) -> bool {
        let frame_pending = self.tracker.host().frame_pending();
        let mut feed_closed = false;
        tokio::select! {
            maybe_event = events.recv() => match maybe_event {
                Some(event) => self.handle_input(event),
                None => return false,
            },
            maybe_feed = next_feed(feed) => match maybe_feed {
                Some(item) => self.handle_feed(item),
                None => feed_closed = true,
            },
            _ = frames.tick(), if frame_pending => self.advance_frame(),
        }
        if feed_closed {
            info!("Log feed closed");
            self.set_status("Log tail stopped".to_string());
            *feed = None;
        }
        true
    }

    fn handle_input(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Resize(..) => self.needs_redraw = true,
            _ => {}
        }
    }

    fn advance_frame(&mut self) {
        if self.tracker.host_mut().take_frame_request() {
            self.tracker.on_frame();
        }
    }

    fn handle_feed(&mut self, item: LogFeed) {
        match item {
            LogFeed::Line(line) => {
                if let Some(event) = self.tracker.on_log_line(&line) {
                    self.set_status(format!("Last event: {event:?}"));
                }
            }
            LogFeed::Zone(zone_id) => {
                if let Err(err) = self.tracker.on_zone_change(zone_id) {
                    error!(?err, zone_id, "Failed to start voyage");
                    self.set_status(format!("Catalog error: {err}"));
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            _ => {}
        }
    }

    fn set_status(&mut self, message: String) {
        debug!(%message, "Status updated");
        self.status = message;
        self.needs_redraw = true;
    }

    fn draw(&self, frame: &mut Frame) {
        let snapshot = self.tracker.host().snapshot();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(10),
                Constraint::Min(3),
                Constraint::Length(3),
            ])
            .split(frame.size());

        if snapshot.active {
            self.render_voyage(frame, chunks[0], snapshot);
            self.render_timer(frame, chunks[1], snapshot);
            self.render_targets(frame, chunks[2], snapshot);
        } else {
            let idle = chunks[0].union(chunks[2]);
            self.render_waiting(frame, idle);
        }
        self.render_status(frame, chunks[3]);
    }

    fn render_voyage(&self, frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
        let block = Block::default().borders(Borders::ALL).title("Voyage");
        let name = snapshot.route_name.clone().unwrap_or_default();
        let bait = snapshot.bait.clone().unwrap_or_default();
        let spectral = snapshot.spectral_bait.clone().unwrap_or_default();
        let lines = vec![
            Line::from(Span::styled(
                name,
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(vec![
                Span::styled(bait, Style::default().fg(self.theme.primary_fg)),
                Span::styled(" → ", Style::default().fg(self.theme.muted)),
                Span::styled(spectral, Style::default().fg(self.theme.spectral)),
            ]),
        ];
        let paragraph = Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
    }

    fn render_timer(&self, frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
        let title = match (snapshot.casting, snapshot.spectral, snapshot.mooch) {
            (false, _, _) => "Cast",
            (true, true, true) => "Spectral mooch",
            (true, true, false) => "Spectral cast",
            (true, false, true) => "Mooch",
            (true, false, false) => "Casting",
        };
        let color = if snapshot.spectral {
            self.theme.spectral
        } else if snapshot.casting {
            self.theme.accent
        } else {
            self.theme.muted
        };
        let lines: Vec<Line> = clock_font::render(&snapshot.elapsed)
            .into_iter()
            .map(|row| Line::from(Span::styled(row, Style::default().fg(color))))
            .collect();
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(title))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
    }

    fn render_targets(&self, frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
        let block = Block::default().borders(Borders::ALL).title("Targets");
        if snapshot.targets.is_empty() {
            let paragraph = Paragraph::new("No recommended targets at this stop")
                .block(block)
                .style(Style::default().fg(self.theme.muted));
            frame.render_widget(paragraph, area);
            return;
        }
        let items: Vec<ListItem> = snapshot
            .targets
            .iter()
            .map(|target| ListItem::new(self.target_line(target)))
            .collect();
        frame.render_widget(List::new(items).block(block), area);
    }

    fn target_line(&self, target: &TargetView) -> Line<'static> {
        let mut name = target.name.clone();
        if target.is_mooch {
            name.push('*');
        }
        let base = if target.in_bite_window {
            Style::default()
                .bg(self.theme.highlight_bg)
                .fg(self.theme.highlight_fg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.theme.primary_fg)
        };
        let tug_style = if target.in_bite_window {
            base
        } else {
            Style::default().fg(self.theme.tug(target.tug))
        };
        Line::from(vec![
            Span::styled(format!("{:<4}", target.tug_glyph), tug_style),
            Span::styled(format!("{:>7}s ", target.window), base),
            Span::styled(format!("{:>5} ", target.points), base),
            Span::styled(name, base),
        ])
    }

    fn render_waiting(&self, frame: &mut Frame, area: Rect) {
        let lines = vec![
            Line::from(Span::styled(
                "Waiting for ocean fishing",
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Board the boat and the voyage will appear here.",
                Style::default().fg(self.theme.muted),
            )),
        ];
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Tidewatch"))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let source = self
            .log_path
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "no log".to_string());
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Status ({source})"));
        let line = Line::from(vec![
            Span::raw(self.status.clone()),
            Span::styled("  q to quit", Style::default().fg(self.theme.muted)),
        ]);
        let paragraph = Paragraph::new(line).block(block).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn frame_interval(period: Duration) -> Interval {
    let mut frames = time::interval(period);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    frames
}

async fn next_feed(feed: &mut Option<mpsc::Receiver<LogFeed>>) -> Option<LogFeed> {
    match feed {
        Some(rx) => rx.recv().await,
        None => future::pending().await,
    }
}

/// Forward terminal input to the event loop until it goes away.
fn spawn_input_thread(sender: mpsc::Sender<Event>, poll: Duration) {
    thread::spawn(move || loop {
        match event::poll(poll) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(evt).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.is_closed() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tidewatch_core::{catalog::Catalog, config::AppConfig, TrackerSettings};

    const CAST: &str = "00|2021-11-25T05:30:00.0000000+00:00|08c3||You cast your line.|a";

    fn app() -> Result<TidewatchApp> {
        let settings = TrackerSettings::from_config(&AppConfig::default());
        let tracker = Tracker::new(TerminalHost::new(), Catalog::embedded()?, settings);
        let cadence = Cadence {
            frame: Duration::from_millis(20),
            idle: Duration::from_millis(250),
        };
        Ok(TidewatchApp::new(tracker, cadence, None))
    }

    #[tokio::test]
    async fn timer_advances_without_input() -> Result<()> {
        let mut app = app()?;
        let (_event_tx, mut events) = mpsc::channel::<Event>(8);
        let mut feed = None;
        let mut frames = frame_interval(app.cadence.frame);

        app.handle_feed(LogFeed::Zone(900));
        app.handle_feed(LogFeed::Line(CAST.to_string()));
        assert!(app.tracker.host().frame_pending());

        time::sleep(Duration::from_millis(150)).await;
        let stepped = time::timeout(
            Duration::from_secs(1),
            app.step(&mut events, &mut feed, &mut frames),
        )
        .await?;
        assert!(stepped);
        assert!(app.tracker.host().snapshot().elapsed_seconds >= 0.1);
        assert!(app.tracker.host().frame_pending());
        Ok(())
    }

    #[tokio::test]
    async fn timer_keeps_running_under_continuous_input() -> Result<()> {
        let mut app = app()?;
        let (event_tx, mut events) = mpsc::channel::<Event>(128);
        let mut feed = None;
        let mut frames = frame_interval(app.cadence.frame);

        app.handle_feed(LogFeed::Zone(900));
        app.handle_feed(LogFeed::Line(CAST.to_string()));
        time::sleep(Duration::from_millis(150)).await;
        for _ in 0..100 {
            event_tx.try_send(Event::FocusGained)?;
        }

        for _ in 0..100 {
            assert!(app.step(&mut events, &mut feed, &mut frames).await);
            if app.tracker.host().snapshot().elapsed_seconds > 0.0 {
                break;
            }
        }
        assert!(app.tracker.host().snapshot().elapsed_seconds >= 0.1);
        Ok(())
    }

    #[tokio::test]
    async fn no_frames_while_idle() -> Result<()> {
        let mut app = app()?;
        let (_event_tx, mut events) = mpsc::channel::<Event>(8);
        let mut feed = None;
        let mut frames = frame_interval(app.cadence.frame);

        app.handle_feed(LogFeed::Zone(900));
        assert!(!app.tracker.host().frame_pending());
        let stepped = time::timeout(
            Duration::from_millis(100),
            app.step(&mut events, &mut feed, &mut frames),
        )
        .await;
        assert!(stepped.is_err());
        Ok(())
    }
}
