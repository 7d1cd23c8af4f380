// SPDX-License-Identifier: GPL-3.0-only

//! Local viewer rendered in the terminal
//!
//! Draws each annotated frame with Unicode half-block characters, two image
//! rows per terminal row, plus a one-line status bar.

use crate::capture::{DisplayAction, FrameDisplay};
use crate::constants::QUIT_KEY;
use crate::errors::AppResult;
use crate::pipelines::AnnotatedFrame;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use image::RgbImage;
use ratatui::{
    Terminal, backend::CrosstermBackend, buffer::Buffer, layout::Rect, style::Color,
    widgets::Widget,
};
use std::io::{self, Stdout, stdout};
use std::time::Duration;
use tracing::{info, warn};

/// Terminal window showing the false-color stream
///
/// Raw mode and the alternate screen are restored when dropped.
pub struct TerminalDisplay {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    status: String,
}

impl TerminalDisplay {
    pub fn new(stream_url: &str) -> AppResult<Self> {
        enable_raw_mode()?;
        let mut out = stdout();
        if let Err(e) = execute!(out, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e.into());
        }
        let terminal = Terminal::new(CrosstermBackend::new(out))?;
        info!("Terminal display started");

        Ok(Self {
            terminal,
            status: build_status_message(stream_url),
        })
    }

    fn draw(&mut self, frame: &AnnotatedFrame) -> io::Result<()> {
        let status = format!("{:.1}C | {}", frame.temperature, self.status);
        self.terminal.draw(|f| {
            let area = f.area();

            // Reserve bottom line for status
            let image_area = Rect {
                height: area.height.saturating_sub(1),
                ..area
            };
            f.render_widget(FrameWidget { image: &frame.image }, image_area);

            let status_area = Rect {
                x: area.x,
                y: area.y + area.height.saturating_sub(1),
                width: area.width,
                height: 1,
            };
            f.render_widget(StatusBar { message: &status }, status_area);
        })?;
        Ok(())
    }

    /// Drain pending key events
    fn poll_quit(&self) -> io::Result<bool> {
        while event::poll(Duration::from_millis(1))? {
            if let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                // Raw mode swallows SIGINT, so Ctrl+C arrives as a key
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
                {
                    return Ok(true);
                }
                if key.code == KeyCode::Char(QUIT_KEY) {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

impl FrameDisplay for TerminalDisplay {
    fn show(&mut self, frame: &AnnotatedFrame) -> AppResult<DisplayAction> {
        self.draw(frame)?;
        if self.poll_quit()? {
            return Ok(DisplayAction::Quit);
        }
        Ok(DisplayAction::Continue)
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            warn!(error = %e, "Failed to leave raw mode");
        }
        if let Err(e) = execute!(self.terminal.backend_mut(), LeaveAlternateScreen) {
            warn!(error = %e, "Failed to leave alternate screen");
        }
        let _ = self.terminal.show_cursor();
        info!("Terminal display closed");
    }
}

fn build_status_message(stream_url: &str) -> String {
    format!("{} | '{}' quit", stream_url, QUIT_KEY)
}

/// Fit an image of `width` x `height` into `area` using half-block cells
///
/// Returns the size in terminal cells (columns, rows).
fn fit_half_blocks(width: u32, height: u32, area: Rect) -> (u16, u16) {
    if width == 0 || height == 0 || area.width == 0 || area.height == 0 {
        return (0, 0);
    }
    let frame_aspect = width as f64 / height as f64;
    let term_width = area.width as f64;
    let term_height = (area.height * 2) as f64;

    if term_width / term_height > frame_aspect {
        // Terminal is wider - fit to height
        let w = term_height * frame_aspect;
        (w as u16, area.height)
    } else {
        // Terminal is taller - fit to width
        let h = term_width / frame_aspect;
        (area.width, (h / 2.0) as u16)
    }
}

/// Widget that renders an RGB image using half-block characters
struct FrameWidget<'a> {
    image: &'a RgbImage,
}

impl Widget for FrameWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (display_width, display_height) =
            fit_half_blocks(self.image.width(), self.image.height(), area);
        if display_width == 0 || display_height == 0 {
            return;
        }

        // Center the image
        let x_offset = area.x + (area.width.saturating_sub(display_width)) / 2;
        let y_offset = area.y + (area.height.saturating_sub(display_height)) / 2;

        let x_scale = self.image.width() as f64 / display_width as f64;
        let y_scale = self.image.height() as f64 / (display_height as f64 * 2.0);

        // Upper half (▀) takes fg, lower half takes bg
        for ty in 0..display_height {
            for tx in 0..display_width {
                let src_x = (tx as f64 * x_scale) as u32;
                let src_y_top = (ty as f64 * 2.0 * y_scale) as u32;
                let src_y_bottom = ((ty as f64 * 2.0 + 1.0) * y_scale) as u32;

                if let Some(cell) = buf.cell_mut((x_offset + tx, y_offset + ty)) {
                    cell.set_char('▀');
                    cell.set_fg(sample_pixel(self.image, src_x, src_y_top));
                    cell.set_bg(sample_pixel(self.image, src_x, src_y_bottom));
                }
            }
        }
    }
}

fn sample_pixel(image: &RgbImage, x: u32, y: u32) -> Color {
    let x = x.min(image.width() - 1);
    let y = y.min(image.height() - 1);
    let [r, g, b] = image.get_pixel(x, y).0;
    Color::Rgb(r, g, b)
}

/// Status bar widget
struct StatusBar<'a> {
    message: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = ratatui::style::Style::default()
            .fg(Color::White)
            .bg(Color::DarkGray);

        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(Color::DarkGray);
            }
        }

        let text: String = self.message.chars().take(area.width as usize).collect();
        buf.set_string(area.x, area.y, text, style);
    }
}
