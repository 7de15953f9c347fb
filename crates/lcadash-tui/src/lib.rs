// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod pages;

pub use pages::{
    CALCULATION_SETUP, CONTRIBUTION_ANALYSIS, HOME, IMPACT_OVERVIEW, PROCESS_DEFINITION, Pane,
    Workbench, menu, menu_items, route_table,
};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use lcadash_app::{
    AmountEdit, Column, Location, LocationEvent, MemoryLocation, MenuNodeId, NavEvent, Notice,
    NoticeLevel, ProcessCatalog, Router, RouteScheme, Session, SessionCommand, SessionEvent,
    Theme,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::debug;

const STATUS_TTL: Duration = Duration::from_secs(4);
const MENU_WIDTH: u16 = 34;
const EDIT_CURSOR: &str = "▏";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiOptions {
    pub scheme: RouteScheme,
    /// Initial address, decoded with `scheme`. Empty opens the default route.
    pub start: String,
    pub theme: Theme,
    pub theme_poll: Duration,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            scheme: RouteScheme::Hash,
            start: String::new(),
            theme: Theme::Dark,
            theme_poll: Duration::from_millis(200),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    ThemeTick,
}

/// Remembers the last theme it saw so restyling only happens on change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeWatcher {
    last_seen: Theme,
    restyles: usize,
}

impl ThemeWatcher {
    pub const fn new(theme: Theme) -> Self {
        Self {
            last_seen: theme,
            restyles: 0,
        }
    }

    pub fn poll(&mut self, current: Theme) -> Option<Theme> {
        if current == self.last_seen {
            return None;
        }
        self.last_seen = current;
        self.restyles += 1;
        Some(current)
    }

    pub const fn last_seen(&self) -> Theme {
        self.last_seen
    }

    pub const fn restyles(&self) -> usize {
        self.restyles
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Palette {
    text: Color,
    muted: Color,
    accent: Color,
    warning: Color,
    cursor: Color,
}

impl Palette {
    const fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                text: Color::White,
                muted: Color::DarkGray,
                accent: Color::Cyan,
                warning: Color::Yellow,
                cursor: Color::DarkGray,
            },
            Theme::Light => Self {
                text: Color::Black,
                muted: Color::Gray,
                accent: Color::Blue,
                warning: Color::Red,
                cursor: Color::Gray,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Menu,
    Sidebar,
    Processes,
    FunctionalUnit,
}

impl Focus {
    const fn label(self) -> &'static str {
        match self {
            Self::Menu => "menu",
            Self::Sidebar => "sidebar",
            Self::Processes => "processes",
            Self::FunctionalUnit => "functional unit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SidebarField {
    Project,
    Database,
    Filter(Column),
    Apply,
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum InputMode {
    Address(String),
    Filter(Column),
    Search(String),
    Amount { index: usize, buffer: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ViewData {
    focus: Focus,
    menu_cursor: usize,
    sidebar_cursor: usize,
    process_cursor: usize,
    unit_cursor: usize,
    input: Option<InputMode>,
    help_visible: bool,
    status_token: u64,
    theme: ThemeWatcher,
    palette: Palette,
}

impl ViewData {
    fn new(theme: Theme) -> Self {
        Self {
            focus: Focus::Menu,
            menu_cursor: 0,
            sidebar_cursor: 0,
            process_cursor: 0,
            unit_cursor: 0,
            input: None,
            help_visible: false,
            status_token: 0,
            theme: ThemeWatcher::new(theme),
            palette: Palette::for_theme(theme),
        }
    }
}

/// The running dashboard: router, session, catalog and the in-memory
/// address the router follows.
pub struct App<R> {
    router: Router<Workbench<R>, Pane>,
    workbench: Workbench<R>,
    location: MemoryLocation,
    location_rx: Receiver<LocationEvent>,
    theme_poll: Duration,
    view: ViewData,
}

impl<R> App<R> {
    pub fn router(&self) -> &Router<Workbench<R>, Pane> {
        &self.router
    }

    pub fn session(&self) -> &Session {
        &self.workbench.session
    }

    pub fn catalog(&self) -> &R {
        &self.workbench.catalog
    }

    pub fn location(&self) -> &MemoryLocation {
        &self.location
    }

    pub fn theme_watcher(&self) -> &ThemeWatcher {
        &self.view.theme
    }

    fn on_setup_page(&self) -> bool {
        self.router.containers().main == Some(Pane::ProcessBrowser)
    }

    fn sidebar_fields(&self) -> Vec<SidebarField> {
        if !self.on_setup_page() {
            return Vec::new();
        }
        let mut fields = vec![SidebarField::Project, SidebarField::Database];
        if self.workbench.session.has_database() {
            fields.extend(Column::PROCESS_TABLE.map(SidebarField::Filter));
            fields.push(SidebarField::Apply);
            fields.push(SidebarField::Clear);
        }
        fields
    }
}

impl<R: ProcessCatalog> App<R> {
    pub fn new(catalog: R, options: &UiOptions) -> Result<Self> {
        let router = Router::new(pages::route_table()?, options.scheme, pages::menu())
            .context("build navigation")?;
        let (location_tx, location_rx) = mpsc::channel();
        let mut location = MemoryLocation::new(options.start.clone());
        location.subscribe(location_tx);

        Ok(Self {
            router,
            workbench: Workbench::new(Session::new(options.theme), catalog),
            location,
            location_rx,
            theme_poll: options.theme_poll,
            view: ViewData::new(options.theme),
        })
    }

    /// Renders the route named by the initial address. Fails only when the
    /// default route cannot be rendered.
    pub fn start(&mut self, internal_tx: &Sender<InternalEvent>) -> Result<()> {
        let events = self
            .router
            .start(&mut self.workbench, Some(&self.location))?;
        self.after_navigation(&events, internal_tx);
        Ok(())
    }

    pub fn process_internal_events(
        &mut self,
        internal_tx: &Sender<InternalEvent>,
        internal_rx: &Receiver<InternalEvent>,
    ) -> Result<()> {
        while let Ok(event) = internal_rx.try_recv() {
            match event {
                InternalEvent::ClearStatus { token } if token == self.view.status_token => {
                    self.workbench.session.dispatch(SessionCommand::ClearNotice);
                }
                InternalEvent::ClearStatus { .. } => {}
                InternalEvent::ThemeTick => self.poll_theme(),
            }
        }

        while let Ok(LocationEvent::Changed { address }) = self.location_rx.try_recv() {
            let events = self
                .router
                .on_location_changed(&address, &mut self.workbench)?;
            self.after_navigation(&events, internal_tx);
        }
        Ok(())
    }

    /// Returns true when the user asked to quit.
    pub fn handle_key_event(
        &mut self,
        key: KeyEvent,
        internal_tx: &Sender<InternalEvent>,
    ) -> bool {
        if self.view.input.is_some() {
            self.handle_input_key(key, internal_tx);
            return false;
        }
        if self.view.help_visible {
            self.view.help_visible = false;
            return false;
        }

        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Tab => self.rotate_focus(1),
            KeyCode::BackTab => self.rotate_focus(-1),
            KeyCode::Char('?') => self.view.help_visible = true,
            KeyCode::Char('T') => {
                self.workbench.session.dispatch(SessionCommand::ToggleTheme);
            }
            KeyCode::Char('g') => self.view.input = Some(InputMode::Address(String::new())),
            KeyCode::Char('[') => {
                if !self.location.back() {
                    self.emit_status(Notice::info("no earlier page"), internal_tx);
                }
            }
            KeyCode::Char(']') => {
                if !self.location.forward() {
                    self.emit_status(Notice::info("no later page"), internal_tx);
                }
            }
            _ => match self.view.focus {
                Focus::Menu => self.handle_menu_key(key),
                Focus::Sidebar => self.handle_sidebar_key(key, internal_tx),
                Focus::Processes => self.handle_process_key(key, internal_tx),
                Focus::FunctionalUnit => self.handle_unit_key(key, internal_tx),
            },
        }
        self.clamp_cursors();
        false
    }

    fn poll_theme(&mut self) {
        if let Some(theme) = self.view.theme.poll(self.workbench.session.theme) {
            debug!(theme = theme.as_str(), "restyling");
            self.view.palette = Palette::for_theme(theme);
        }
    }

    fn after_navigation(&mut self, events: &[NavEvent], internal_tx: &Sender<InternalEvent>) {
        for event in events {
            match event {
                NavEvent::UnknownRoute {
                    requested,
                    substituted,
                } => self.emit_status(
                    Notice::warning(format!("no page at `{requested}`; showing {substituted}")),
                    internal_tx,
                ),
                NavEvent::RenderFailed { path, error } => self.emit_status(
                    Notice::warning(format!("`{path}` failed to open: {error}")),
                    internal_tx,
                ),
                NavEvent::RouteChanged { .. } => {
                    self.view.sidebar_cursor = 0;
                    self.view.process_cursor = 0;
                    self.view.unit_cursor = 0;
                }
                _ => {}
            }
        }

        if let Some(active) = self.router.menu().active() {
            self.view.menu_cursor = active.get();
        }
        if !self.available_focus().contains(&self.view.focus) {
            self.view.focus = Focus::Menu;
        }
        self.clamp_cursors();
    }

    fn available_focus(&self) -> Vec<Focus> {
        let mut focus = vec![Focus::Menu];
        if self.on_setup_page() {
            focus.push(Focus::Sidebar);
            if self.workbench.session.has_database() {
                focus.push(Focus::Processes);
                focus.push(Focus::FunctionalUnit);
            }
        }
        focus
    }

    fn rotate_focus(&mut self, delta: isize) {
        let available = self.available_focus();
        let current = available
            .iter()
            .position(|focus| *focus == self.view.focus)
            .unwrap_or(0) as isize;
        let len = available.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.view.focus = available[next];
    }

    fn clamp_cursors(&mut self) {
        let clamp = |cursor: usize, len: usize| cursor.min(len.saturating_sub(1));
        self.view.menu_cursor = clamp(self.view.menu_cursor, self.router.menu().nodes().len());
        self.view.sidebar_cursor = clamp(self.view.sidebar_cursor, self.sidebar_fields().len());
        self.view.process_cursor = clamp(
            self.view.process_cursor,
            self.workbench.session.visible_rows().len(),
        );
        self.view.unit_cursor = clamp(self.view.unit_cursor, self.workbench.session.unit().len());
    }

    fn handle_menu_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.view.menu_cursor += 1,
            KeyCode::Char('k') | KeyCode::Up => {
                self.view.menu_cursor = self.view.menu_cursor.saturating_sub(1);
            }
            KeyCode::Enter | KeyCode::Char('l') => {
                let id = MenuNodeId::new(self.view.menu_cursor);
                self.router.menu_click(id, &mut self.location);
            }
            _ => {}
        }
    }

    fn handle_sidebar_key(&mut self, key: KeyEvent, internal_tx: &Sender<InternalEvent>) {
        let fields = self.sidebar_fields();
        let Some(field) = fields.get(self.view.sidebar_cursor).copied() else {
            return;
        };
        match (key.code, field) {
            (KeyCode::Char('j') | KeyCode::Down, _) => self.view.sidebar_cursor += 1,
            (KeyCode::Char('k') | KeyCode::Up, _) => {
                self.view.sidebar_cursor = self.view.sidebar_cursor.saturating_sub(1);
            }
            (KeyCode::Char('l') | KeyCode::Enter, SidebarField::Project) => {
                self.cycle_project(1, internal_tx);
            }
            (KeyCode::Char('h'), SidebarField::Project) => self.cycle_project(-1, internal_tx),
            (KeyCode::Char('l') | KeyCode::Enter, SidebarField::Database) => {
                self.cycle_database(1, internal_tx);
            }
            (KeyCode::Char('h'), SidebarField::Database) => self.cycle_database(-1, internal_tx),
            (KeyCode::Enter, SidebarField::Filter(column)) => {
                self.view.input = Some(InputMode::Filter(column));
            }
            (KeyCode::Enter, SidebarField::Apply) => {
                self.dispatch(SessionCommand::ApplyFilters, internal_tx);
            }
            (KeyCode::Enter, SidebarField::Clear) => {
                self.dispatch(SessionCommand::ClearFilters, internal_tx);
            }
            _ => {}
        }
    }

    fn cycle_project(&mut self, delta: isize, internal_tx: &Sender<InternalEvent>) {
        let session = &self.workbench.session;
        let Some(name) = cycle_choice(session.projects(), session.project(), delta) else {
            self.emit_status(Notice::warning("no projects available"), internal_tx);
            return;
        };
        let events = self
            .workbench
            .session
            .select_project(&mut self.workbench.catalog, &name);
        self.track_session_events(&events, internal_tx);
    }

    fn cycle_database(&mut self, delta: isize, internal_tx: &Sender<InternalEvent>) {
        let session = &self.workbench.session;
        if session.project().is_none() {
            self.emit_status(Notice::info("select a project first"), internal_tx);
            return;
        }
        let Some(name) = cycle_choice(session.databases(), session.database(), delta) else {
            self.emit_status(Notice::warning("project has no databases"), internal_tx);
            return;
        };
        let events = self
            .workbench
            .session
            .select_database(&mut self.workbench.catalog, &name);
        self.track_session_events(&events, internal_tx);
    }

    fn handle_process_key(&mut self, key: KeyEvent, internal_tx: &Sender<InternalEvent>) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.view.process_cursor += 1,
            KeyCode::Char('k') | KeyCode::Up => {
                self.view.process_cursor = self.view.process_cursor.saturating_sub(1);
            }
            KeyCode::Char(' ') => {
                let visible = self.workbench.session.visible_rows();
                if let Some(row) = visible.get(self.view.process_cursor).copied() {
                    self.dispatch(SessionCommand::ToggleRow(row), internal_tx);
                }
            }
            KeyCode::Char('a') => self.dispatch(SessionCommand::AddSelection, internal_tx),
            KeyCode::Char('/') => {
                let current = self.workbench.session.search().unwrap_or_default().to_owned();
                self.view.input = Some(InputMode::Search(current));
            }
            KeyCode::Esc => self.dispatch(SessionCommand::ClearSelection, internal_tx),
            _ => {}
        }
    }

    fn handle_unit_key(&mut self, key: KeyEvent, internal_tx: &Sender<InternalEvent>) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.view.unit_cursor += 1,
            KeyCode::Char('k') | KeyCode::Up => {
                self.view.unit_cursor = self.view.unit_cursor.saturating_sub(1);
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                let index = self.view.unit_cursor;
                if let Some(entry) = self.workbench.session.unit().entries().get(index) {
                    self.view.input = Some(InputMode::Amount {
                        index,
                        buffer: format!("{:?}", entry.amount),
                    });
                }
            }
            KeyCode::Char('d') => {
                self.dispatch(SessionCommand::DeleteEntry(self.view.unit_cursor), internal_tx);
            }
            _ => {}
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent, internal_tx: &Sender<InternalEvent>) {
        let Some(mode) = self.view.input.take() else {
            return;
        };
        match mode {
            InputMode::Address(mut buffer) => match key.code {
                KeyCode::Enter => self.router.set_route(&buffer, &mut self.location),
                KeyCode::Esc => {}
                KeyCode::Backspace => {
                    buffer.pop();
                    self.view.input = Some(InputMode::Address(buffer));
                }
                KeyCode::Char(ch) => {
                    buffer.push(ch);
                    self.view.input = Some(InputMode::Address(buffer));
                }
                _ => self.view.input = Some(InputMode::Address(buffer)),
            },
            InputMode::Filter(column) => {
                let mut text = self.workbench.session.filters().input(column).to_owned();
                match key.code {
                    KeyCode::Enter | KeyCode::Esc => return,
                    KeyCode::Backspace => {
                        text.pop();
                    }
                    KeyCode::Char(ch) => text.push(ch),
                    KeyCode::Tab if column == Column::Process => {
                        if let Some(name) = self.workbench.session.complete_process(&text) {
                            text = name.to_owned();
                        }
                    }
                    _ => {}
                }
                self.view.input = Some(InputMode::Filter(column));
                self.dispatch(SessionCommand::SetFilter { column, text }, internal_tx);
                self.clamp_cursors();
            }
            InputMode::Search(mut buffer) => match key.code {
                KeyCode::Enter => {
                    let events = self
                        .workbench
                        .session
                        .search_database(&mut self.workbench.catalog, &buffer);
                    self.track_session_events(&events, internal_tx);
                    self.clamp_cursors();
                }
                KeyCode::Esc => {}
                KeyCode::Backspace => {
                    buffer.pop();
                    self.view.input = Some(InputMode::Search(buffer));
                }
                KeyCode::Char(ch) => {
                    buffer.push(ch);
                    self.view.input = Some(InputMode::Search(buffer));
                }
                _ => self.view.input = Some(InputMode::Search(buffer)),
            },
            InputMode::Amount { index, mut buffer } => match key.code {
                KeyCode::Enter => {
                    self.dispatch(SessionCommand::EditAmount { index, raw: buffer }, internal_tx);
                }
                KeyCode::Esc => {}
                KeyCode::Backspace => {
                    buffer.pop();
                    self.view.input = Some(InputMode::Amount { index, buffer });
                }
                KeyCode::Char(ch) => {
                    buffer.push(ch);
                    self.view.input = Some(InputMode::Amount { index, buffer });
                }
                _ => self.view.input = Some(InputMode::Amount { index, buffer }),
            },
        }
    }

    fn dispatch(&mut self, command: SessionCommand, internal_tx: &Sender<InternalEvent>) {
        let events = self.workbench.session.dispatch(command);
        for event in &events {
            if let SessionEvent::AmountEdited {
                index,
                outcome: AmountEdit::Updated { previous, current },
            } = event
            {
                debug!(index, previous, current, "amount edited");
            }
        }
        self.track_session_events(&events, internal_tx);
    }

    /// Notices raised inside the session expire like any other status.
    fn track_session_events(
        &mut self,
        events: &[SessionEvent],
        internal_tx: &Sender<InternalEvent>,
    ) {
        if events
            .iter()
            .any(|event| matches!(event, SessionEvent::NoticeSet(_)))
        {
            self.view.status_token = self.view.status_token.saturating_add(1);
            schedule_status_clear(internal_tx, self.view.status_token);
        }
    }

    fn emit_status(&mut self, notice: Notice, internal_tx: &Sender<InternalEvent>) {
        let events = self
            .workbench
            .session
            .dispatch(SessionCommand::SetNotice(notice));
        self.track_session_events(&events, internal_tx);
    }
}

fn cycle_choice(options: &[String], current: Option<&str>, delta: isize) -> Option<String> {
    if options.is_empty() {
        return None;
    }
    let len = options.len() as isize;
    let next = match current.and_then(|name| options.iter().position(|option| option == name)) {
        Some(index) => (index as isize + delta).rem_euclid(len) as usize,
        None if delta < 0 => options.len() - 1,
        None => 0,
    };
    Some(options[next].clone())
}

pub fn run_app<R: ProcessCatalog>(app: &mut App<R>) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let (internal_tx, internal_rx) = mpsc::channel();
    spawn_theme_ticker(&internal_tx, app.theme_poll);

    let mut result = app.start(&internal_tx);
    while result.is_ok() {
        if let Err(error) = app.process_internal_events(&internal_tx, &internal_rx) {
            result = Err(error);
            break;
        }

        if let Err(error) = terminal.draw(|frame| render(frame, app)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event
            && let Event::Key(key) = event::read().context("read event")?
            && app.handle_key_event(key, &internal_tx)
        {
            break;
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_TTL);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn spawn_theme_ticker(internal_tx: &Sender<InternalEvent>, period: Duration) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        loop {
            thread::sleep(period);
            if sender.send(InternalEvent::ThemeTick).is_err() {
                break;
            }
        }
    });
}

fn render<R>(frame: &mut ratatui::Frame<'_>, app: &App<R>) {
    let palette = app.view.palette;
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let header = Paragraph::new(header_text(app))
        .style(Style::default().fg(palette.text))
        .block(Block::default().title("lcadash").borders(Borders::ALL));
    frame.render_widget(header, layout[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(MENU_WIDTH), Constraint::Min(1)])
        .split(layout[1]);
    let menu_height = app.router.menu().nodes().len() as u16 + 2;
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(menu_height), Constraint::Min(1)])
        .split(body[0]);

    render_menu(frame, left[0], app);
    match app.router.containers().sidebar {
        Some(Pane::SetupSidebar) => render_setup_sidebar(frame, left[1], app),
        Some(pane) => render_text_pane(frame, left[1], pane, palette),
        None => {}
    }
    match app.router.containers().main {
        Some(Pane::ProcessBrowser) => render_process_browser(frame, body[1], app),
        Some(pane) => render_text_pane(frame, body[1], pane, palette),
        None => {}
    }

    let (status, style) = match &app.workbench.session.notice {
        Some(notice) if notice.level == NoticeLevel::Warning => {
            (notice.message.clone(), Style::default().fg(palette.warning))
        }
        Some(notice) => (notice.message.clone(), Style::default().fg(palette.accent)),
        None => (status_hint(app), Style::default().fg(palette.muted)),
    };
    let status_widget = Paragraph::new(status)
        .style(style)
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(status_widget, layout[2]);

    if app.view.help_visible {
        let area = centered_rect(70, 60, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn header_text<R>(app: &App<R>) -> String {
    let address = match &app.view.input {
        Some(InputMode::Address(buffer)) => format!("go to: {buffer}{EDIT_CURSOR}"),
        _ => {
            let current = app.location.read();
            if current.is_empty() {
                app.router.address_for(app.router.current_path())
            } else {
                current
            }
        }
    };
    format!(
        "{address}  |  theme: {}",
        app.view.theme.last_seen().as_str()
    )
}

fn render_menu<R>(frame: &mut ratatui::Frame<'_>, area: Rect, app: &App<R>) {
    let palette = app.view.palette;
    let focused = app.view.focus == Focus::Menu;
    let lines = app
        .router
        .menu()
        .nodes()
        .iter()
        .enumerate()
        .map(|(index, node)| {
            let marker = if focused && index == app.view.menu_cursor {
                "›"
            } else {
                " "
            };
            let glyph = if !node.selectable() {
                "▾"
            } else if node.icon_name().ends_with("_outlined") {
                "○"
            } else {
                "●"
            };
            let mut style = Style::default().fg(palette.text);
            if !node.selectable() {
                style = style.fg(palette.muted).add_modifier(Modifier::BOLD);
            }
            if app.router.menu().active() == Some(node.id) {
                style = style.fg(palette.accent).add_modifier(Modifier::BOLD);
            }
            let text = format!(
                "{marker} {}{glyph} {}",
                "  ".repeat(node.depth),
                node.label
            );
            Line::from(Span::styled(text, style))
        })
        .collect::<Vec<_>>();

    let menu = Paragraph::new(lines).block(focus_block("menu", focused, palette));
    frame.render_widget(menu, area);
}

fn render_text_pane(frame: &mut ratatui::Frame<'_>, area: Rect, pane: Pane, palette: Palette) {
    let body = match pane {
        Pane::Text { body, .. } => body,
        Pane::ProcessBrowser | Pane::SetupSidebar => "",
    };
    let widget = Paragraph::new(body)
        .style(Style::default().fg(palette.text))
        .wrap(Wrap { trim: false })
        .block(Block::default().title(pane.title()).borders(Borders::ALL));
    frame.render_widget(widget, area);
}

fn render_setup_sidebar<R>(frame: &mut ratatui::Frame<'_>, area: Rect, app: &App<R>) {
    let palette = app.view.palette;
    let focused = app.view.focus == Focus::Sidebar;
    let session = &app.workbench.session;
    let mut lines = Vec::new();
    for (index, field) in app.sidebar_fields().into_iter().enumerate() {
        let marker = if focused && index == app.view.sidebar_cursor {
            "›"
        } else {
            " "
        };
        let text = match field {
            SidebarField::Project => format!(
                "Project:  ‹ {} ›",
                session.project().unwrap_or("choose")
            ),
            SidebarField::Database => {
                let value = match (session.project(), session.database()) {
                    (None, _) => "Select project first",
                    (Some(_), None) => "choose",
                    (Some(_), Some(name)) => name,
                };
                format!("Database: ‹ {value} ›")
            }
            SidebarField::Filter(column) => {
                let editing = app.view.input == Some(InputMode::Filter(column));
                format!(
                    "Filter {}: {}{}",
                    column.as_str(),
                    session.filters().input(column),
                    if editing { EDIT_CURSOR } else { "" }
                )
            }
            SidebarField::Apply => "[ Apply Filters ]".to_owned(),
            SidebarField::Clear => "[ Clear Filters ]".to_owned(),
        };
        lines.push(Line::from(Span::styled(
            format!("{marker} {text}"),
            Style::default().fg(palette.text),
        )));
    }
    if !session.has_database() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "To browse products & processes, please select a project and database first.",
            Style::default().fg(palette.muted),
        )));
    }

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(focus_block(Pane::SetupSidebar.title(), focused, palette));
    frame.render_widget(widget, area);
}

fn render_process_browser<R>(frame: &mut ratatui::Frame<'_>, area: Rect, app: &App<R>) {
    let palette = app.view.palette;
    let session = &app.workbench.session;
    if !session.has_database() {
        let hint = Paragraph::new(
            "To browse products & processes, please select a project and database first.",
        )
        .style(Style::default().fg(palette.muted))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(Pane::ProcessBrowser.title())
                .borders(Borders::ALL),
        );
        frame.render_widget(hint, area);
        return;
    }

    let split = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let visible = session.visible_rows();
    let focused = app.view.focus == Focus::Processes;
    let rows = window(&visible, app.view.process_cursor, split[0])
        .map(|(position, row)| {
            let record = &session.displayed()[*row];
            let mark = if session.is_selected(*row) { "[x]" } else { "[ ]" };
            let mut style = Style::default().fg(palette.text);
            if focused && position == app.view.process_cursor {
                style = style.bg(palette.cursor);
            }
            Row::new(vec![
                Cell::from(mark),
                Cell::from(record.product.clone()),
                Cell::from(record.process.clone()),
                Cell::from(record.location.clone()),
            ])
            .style(style)
        })
        .collect::<Vec<_>>();
    let mut title = format!(
        "Processes {}/{} | {} selected",
        visible.len(),
        session.displayed().len(),
        session.selected_records().len()
    );
    if let Some(InputMode::Search(buffer)) = &app.view.input {
        title.push_str(&format!(" | search: {buffer}{EDIT_CURSOR}"));
    } else if let Some(term) = session.search() {
        title.push_str(&format!(" | search: {term}"));
    }
    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Percentage(30),
            Constraint::Percentage(50),
            Constraint::Min(8),
        ],
    )
    .header(header_row(&["", "Product", "Process", "Location"], palette))
    .column_spacing(1)
    .block(focus_block(&title, focused, palette));
    frame.render_widget(table, split[0]);

    let entries = session.unit().entries();
    let indices = (0..entries.len()).collect::<Vec<_>>();
    let focused = app.view.focus == Focus::FunctionalUnit;
    let rows = window(&indices, app.view.unit_cursor, split[1])
        .map(|(position, index)| {
            let entry = &entries[*index];
            let amount = match &app.view.input {
                Some(InputMode::Amount { index: editing, buffer }) if editing == index => {
                    format!("{buffer}{EDIT_CURSOR}")
                }
                _ => format!("{:?}", entry.amount),
            };
            let mut style = Style::default().fg(palette.text);
            if focused && position == app.view.unit_cursor {
                style = style.bg(palette.cursor);
            }
            Row::new(vec![
                Cell::from(amount),
                Cell::from(entry.product.clone()),
                Cell::from(entry.process.clone()),
                Cell::from(entry.location.clone()),
            ])
            .style(style)
        })
        .collect::<Vec<_>>();
    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Percentage(30),
            Constraint::Percentage(45),
            Constraint::Min(8),
        ],
    )
    .header(header_row(
        &Column::FUNCTIONAL_UNIT.map(Column::as_str),
        palette,
    ))
    .column_spacing(1)
    .block(focus_block("Functional Unit", focused, palette));
    frame.render_widget(table, split[1]);
}

/// Rows that fit in `area` around `cursor`, paired with their list position.
fn window<'a, T>(
    items: &'a [T],
    cursor: usize,
    area: Rect,
) -> impl Iterator<Item = (usize, &'a T)> {
    let height = usize::from(area.height.saturating_sub(3)).max(1);
    let offset = cursor.saturating_sub(height - 1);
    items.iter().enumerate().skip(offset).take(height)
}

fn header_row(labels: &[&str], palette: Palette) -> Row<'static> {
    Row::new(
        labels
            .iter()
            .map(|label| {
                Cell::from((*label).to_owned()).style(
                    Style::default()
                        .fg(palette.text)
                        .add_modifier(Modifier::BOLD),
                )
            })
            .collect::<Vec<_>>(),
    )
}

fn focus_block(title: &str, focused: bool, palette: Palette) -> Block<'static> {
    let border = if focused { palette.accent } else { palette.muted };
    Block::default()
        .title(title.to_owned())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
}

fn status_hint<R>(app: &App<R>) -> String {
    match &app.view.input {
        Some(InputMode::Address(_)) => "type a page path | enter go | esc cancel".to_owned(),
        Some(InputMode::Filter(Column::Process)) => {
            "typing filters live | tab complete name | enter/esc done".to_owned()
        }
        Some(InputMode::Filter(_)) => "typing filters live | enter/esc done".to_owned(),
        Some(InputMode::Search(_)) => {
            "search the database | enter run (empty lists all) | esc cancel".to_owned()
        }
        Some(InputMode::Amount { .. }) => "amount | enter commit | esc cancel".to_owned(),
        None => {
            let keys = match app.view.focus {
                Focus::Menu => "j/k move | enter open",
                Focus::Sidebar => "j/k field | h/l choose | enter edit/apply",
                Focus::Processes => "j/k move | space select | a add | / search | esc clear",
                Focus::FunctionalUnit => "j/k move | e edit amount | d delete",
            };
            format!(
                "[{}] {keys} | tab focus | g go | [/] back/fwd | T theme | ? help | q quit",
                app.view.focus.label()
            )
        }
    }
}

fn help_overlay_text() -> &'static str {
    "global: q quit | tab/shift+tab focus | g go to path | [ back | ] forward | T theme | ? help\n\
menu: j/k move | enter/l open page (headers do nothing)\n\
sidebar: j/k field | h/l or enter choose project/database | enter edit filter or apply/clear\n\
filter input: type to filter live | backspace erase | tab complete process name | enter/esc done\n\
processes: j/k move | space toggle selection | a add selection to functional unit | esc clear selection\n\
search: / opens a database search by product or process | enter run | empty search lists all\n\
functional unit: j/k move | e edit amount (enter commit, esc cancel) | d delete\n\
any key closes this help"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
