/// Terminal front end: four half-block viewports and a keyboard-driven panel
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use kview_core::{
    Clipboard, Control, Controller, Debouncer, Geometry, MultiViewRenderer, RenderTarget,
    ViewerConfig,
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod clipboard;
pub mod layout;
pub mod renderer;

pub use clipboard::Osc52Clipboard;
pub use layout::{Layout, Rect};
pub use renderer::PanelView;

/// How long to block for input when nothing is pending
const IDLE_POLL: Duration = Duration::from_millis(500);
/// Camera orbit per key press, in radians
const ORBIT_STEP: f32 = 0.1;
const ZOOM_STEP: f32 = 0.9;

/// Main application struct for the terminal viewer
pub struct TerminalApp {
    controller: Controller,
    layout: Layout,
    size: (u16, u16),
    selected: usize,
    editing: Option<String>,
    status: Option<String>,
    fullscreen: bool,
    resize: Debouncer<(u16, u16)>,
    clipboard: Box<dyn Clipboard>,
    running: bool,
    needs_present: bool,
    needs_clear: bool,
}

impl TerminalApp {
    pub fn new(
        geometry: Geometry,
        config: ViewerConfig,
        show_projections: bool,
    ) -> io::Result<Self> {
        let (cols, rows) = terminal::size()?;
        Ok(Self::with_size(geometry, config, cols, rows, show_projections))
    }

    /// Build the app for a terminal of `cols` x `rows` cells
    pub fn with_size(
        geometry: Geometry,
        config: ViewerConfig,
        cols: u16,
        rows: u16,
        show_projections: bool,
    ) -> Self {
        let layout = Layout::compute(cols, rows, false);
        let targets: Vec<RenderTarget> = layout
            .views
            .iter()
            .map(|(kind, rect)| {
                let (width, height) = rect.pixel_size();
                RenderTarget::new(*kind, width, height)
            })
            .collect();

        let renderer = MultiViewRenderer::new(&config, &targets);
        let mut controller = Controller::new(geometry, renderer);
        controller.set_projections_visible(show_projections);
        controller.flush();

        Self {
            controller,
            layout,
            size: (cols, rows),
            selected: 0,
            editing: None,
            status: None,
            fullscreen: false,
            resize: Debouncer::new(config.resize_debounce),
            clipboard: Box::new(Osc52Clipboard::new(stdout())),
            running: true,
            needs_present: true,
            needs_clear: true,
        }
    }

    pub fn set_clipboard(&mut self, clipboard: Box<dyn Clipboard>) {
        self.clipboard = clipboard;
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn selected(&self) -> Control {
        Control::ALL[self.selected]
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn matrix_text(&self) -> &str {
        self.controller.matrix_text()
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        while self.running {
            self.tick(Instant::now());
            if self.needs_present {
                let mut out = stdout().lock();
                self.present(&mut out)?;
                out.flush()?;
                self.needs_present = false;
            }

            // Block until input arrives or a pending resize is due
            let timeout = self.resize.time_remaining(Instant::now()).unwrap_or(IDLE_POLL);
            if event::poll(timeout)? {
                let event = event::read()?;
                self.handle_event(event, Instant::now());
            }
        }

        Ok(())
    }

    /// Apply a settled resize and run the pipeline if anything changed
    pub fn tick(&mut self, now: Instant) {
        if let Some((cols, rows)) = self.resize.poll(now) {
            self.size = (cols, rows);
            self.apply_layout();
        }
        if self.controller.flush() {
            self.needs_present = true;
        }
    }

    pub fn handle_event(&mut self, event: Event, now: Instant) {
        match event {
            Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            }) => self.handle_key(code),
            Event::Resize(cols, rows) => self.resize.push((cols, rows), now),
            _ => {}
        }
    }

    fn handle_key(&mut self, code: KeyCode) {
        self.needs_present = true;

        if let Some(buffer) = self.editing.as_mut() {
            match code {
                KeyCode::Char(c) if is_number_char(c) => buffer.push(c),
                KeyCode::Backspace => {
                    buffer.pop();
                }
                KeyCode::Enter => self.submit_edit(),
                KeyCode::Esc => self.editing = None,
                _ => {}
            }
            return;
        }

        let control = self.selected();
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Tab | KeyCode::Down => {
                self.selected = (self.selected + 1) % Control::ALL.len()
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.selected = (self.selected + Control::ALL.len() - 1) % Control::ALL.len()
            }
            KeyCode::Left => {
                self.controller.nudge(control, -1);
            }
            KeyCode::Right => {
                self.controller.nudge(control, 1);
            }
            KeyCode::Enter => self.editing = Some(String::new()),
            KeyCode::Char(c) if is_number_char(c) => self.editing = Some(c.to_string()),
            KeyCode::Char('p') => {
                let visible = self.controller.toggle_projections();
                self.status = Some(format!(
                    "Projections {}",
                    if visible { "shown" } else { "hidden" }
                ));
            }
            KeyCode::Char('r') => {
                self.controller.reset();
                self.status = Some("Transform reset".to_string());
            }
            KeyCode::Char('c') => self.controller.reset_camera(),
            KeyCode::Char('w') => self.controller.orbit_camera(0.0, ORBIT_STEP),
            KeyCode::Char('s') => self.controller.orbit_camera(0.0, -ORBIT_STEP),
            KeyCode::Char('a') => self.controller.orbit_camera(-ORBIT_STEP, 0.0),
            KeyCode::Char('d') => self.controller.orbit_camera(ORBIT_STEP, 0.0),
            KeyCode::Char('z') => self.controller.zoom_camera(ZOOM_STEP),
            KeyCode::Char('x') => self.controller.zoom_camera(1.0 / ZOOM_STEP),
            KeyCode::Char('f') => {
                self.fullscreen = !self.fullscreen;
                self.apply_layout();
            }
            KeyCode::Char('y') => self.copy_matrix(),
            _ => {}
        }
    }

    fn submit_edit(&mut self) {
        let Some(text) = self.editing.take() else {
            return;
        };
        let control = self.selected();
        match self.controller.submit_text(control, &text) {
            Ok(value) => self.status = Some(format!("{} = {value}", control.label())),
            Err(e) => {
                log::warn!("rejected input: {e}");
                self.status = Some(e.to_string());
            }
        }
    }

    fn copy_matrix(&mut self) {
        match self.controller.copy_matrix(self.clipboard.as_mut()) {
            Ok(_) => self.status = Some("Matrix copied to clipboard".to_string()),
            Err(e) => {
                log::error!("{e}");
                self.status = Some(format!("Copy failed: {e}"));
            }
        }
    }

    fn apply_layout(&mut self) {
        let (cols, rows) = self.size;
        self.layout = Layout::compute(cols, rows, self.fullscreen);
        for (kind, rect) in self.layout.views.clone() {
            let (width, height) = rect.pixel_size();
            if let Err(e) = self.controller.resize_viewport(kind, width, height) {
                log::warn!("keeping previous size for {}: {e}", kind.label());
            }
        }
        self.needs_clear = true;
        self.needs_present = true;
    }

    /// Write the whole screen to `writer`
    pub fn present<W: Write>(&mut self, writer: &mut W) -> io::Result<()> {
        if self.needs_clear {
            queue!(writer, Clear(ClearType::All))?;
            self.needs_clear = false;
        }

        queue!(
            writer,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "kview | passes: {} | {}x{}",
                self.controller.passes(),
                self.size.0,
                self.size.1
            )),
            ResetColor
        )?;

        let projections_visible = self.controller.renderer().projections_visible();
        for (kind, rect) in &self.layout.views {
            let Some(viewport) = self.controller.renderer().viewport(*kind) else {
                continue;
            };
            renderer::draw_framebuffer(writer, viewport.framebuffer(), *rect)?;

            let label = if kind.is_projection() && !projections_visible {
                format!("{} (hidden)", kind.label())
            } else {
                kind.label().to_string()
            };
            renderer::draw_label(writer, *rect, &label)?;
        }

        if let Some(panel) = self.layout.panel {
            let params = self.controller.params();
            let view = PanelView {
                values: Control::ALL.iter().map(|&c| (c, c.get(params))).collect(),
                selected: self.selected(),
                editing: self.editing.as_deref(),
                projections_visible,
                matrix_text: self.controller.matrix_text(),
                status: self.status.as_deref(),
            };
            renderer::draw_panel(writer, panel, &renderer::panel_lines(&view))?;
        }

        Ok(())
    }
}

fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '-' | '.' | '+')
}
