/// Half-block presenter for framebuffers and the control panel
use crossterm::{
    cursor::MoveTo,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    QueueableCommand,
};
use kview_core::{Control, Framebuffer};
use std::io::{self, Write};

use crate::layout::Rect;

/// Character luminosity ramp for plain-text snapshots (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Upper half block: foreground paints the top pixel, background the bottom
const HALF_BLOCK: char = '\u{2580}';

const SLIDER_WIDTH: usize = 13;

/// Copy a framebuffer into `rect`, two pixel rows per terminal row
pub fn draw_framebuffer<W: Write>(writer: &mut W, fb: &Framebuffer, rect: Rect) -> io::Result<()> {
    let width = (rect.width as usize).min(fb.width());
    let rows = (rect.height as usize).min(fb.height().div_ceil(2));

    for row in 0..rows {
        writer.queue(MoveTo(rect.x, rect.y + row as u16))?;
        let mut last: Option<([u8; 4], [u8; 4])> = None;

        for x in 0..width {
            let top = fb.pixel(x, row * 2);
            let bottom = if row * 2 + 1 < fb.height() {
                fb.pixel(x, row * 2 + 1)
            } else {
                top
            };

            // Only emit colour changes
            if last != Some((top, bottom)) {
                writer
                    .queue(SetForegroundColor(rgb(top)))?
                    .queue(SetBackgroundColor(rgb(bottom)))?;
                last = Some((top, bottom));
            }
            writer.queue(Print(HALF_BLOCK))?;
        }
    }

    writer.queue(ResetColor)?;
    Ok(())
}

/// Print a short caption over the top-left corner of a view
pub fn draw_label<W: Write>(writer: &mut W, rect: Rect, label: &str) -> io::Result<()> {
    if rect.width == 0 || rect.height == 0 {
        return Ok(());
    }
    let text: String = label.chars().take(rect.width as usize).collect();
    writer
        .queue(MoveTo(rect.x, rect.y))?
        .queue(SetForegroundColor(Color::White))?
        .queue(SetBackgroundColor(Color::Black))?
        .queue(Print(text))?
        .queue(ResetColor)?;
    Ok(())
}

/// What the side panel shows
#[derive(Debug, Clone)]
pub struct PanelView<'a> {
    pub values: Vec<(Control, f32)>,
    pub selected: Control,
    /// Contents of the number field while it is being edited
    pub editing: Option<&'a str>,
    pub projections_visible: bool,
    pub matrix_text: &'a str,
    pub status: Option<&'a str>,
}

/// Lay the panel out as plain lines, one per terminal row
pub fn panel_lines(view: &PanelView) -> Vec<String> {
    let mut lines = vec!["Transform".to_string()];

    for &(control, value) in &view.values {
        let marker = if control == view.selected { '>' } else { ' ' };
        let field = match view.editing {
            Some(buffer) if control == view.selected => format!("{buffer}_"),
            _ => format_value(control, value),
        };
        lines.push(format!(
            "{marker} {:<12}{} {field}",
            control.label(),
            slider_bar(control.slider_fraction(value), SLIDER_WIDTH)
        ));
    }

    lines.push(String::new());
    lines.push(format!(
        "Projections: {}",
        if view.projections_visible { "shown" } else { "hidden" }
    ));
    lines.push(String::new());
    lines.push("Matrix".to_string());
    lines.extend(view.matrix_text.lines().map(str::to_string));
    lines.push(String::new());
    lines.push("Tab/Up/Down select  Left/Right slide".to_string());
    lines.push("0-9 type  Enter apply  Esc cancel".to_string());
    lines.push("p projections  r reset  y copy".to_string());
    lines.push("wasd orbit  z/x zoom  c camera".to_string());
    lines.push("f fullscreen  q quit".to_string());

    if let Some(status) = view.status {
        lines.push(String::new());
        lines.push(status.to_string());
    }
    lines
}

/// Draw panel lines into `rect`, padding each row so stale text is erased
pub fn draw_panel<W: Write>(writer: &mut W, rect: Rect, lines: &[String]) -> io::Result<()> {
    let width = rect.width as usize;
    for row in 0..rect.height as usize {
        let line = lines.get(row).map(String::as_str).unwrap_or("");
        let text: String = line.chars().take(width).collect();
        writer.queue(MoveTo(rect.x, rect.y + row as u16))?;
        if row == 0 {
            writer.queue(SetAttribute(Attribute::Bold))?;
        }
        writer
            .queue(Print(format!("{text:<width$}")))?
            .queue(SetAttribute(Attribute::Reset))?;
    }
    Ok(())
}

/// Slider drawn as a track with a knob at `fraction`
pub fn slider_bar(fraction: f32, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let knob = (fraction.clamp(0.0, 1.0) * (width - 1) as f32).round() as usize;
    (0..width).map(|i| if i == knob { 'o' } else { '-' }).collect()
}

/// Render a framebuffer as text using the luminosity ramp
pub fn ascii_frame(fb: &Framebuffer) -> String {
    let mut out = String::with_capacity((fb.width() + 1) * fb.height() / 2);
    // Terminal cells are roughly twice as tall as wide
    for y in (0..fb.height()).step_by(2) {
        for x in 0..fb.width() {
            let [r, g, b, _] = fb.pixel(x, y);
            let luminance = (0.2126 * r as f32 + 0.7152 * g as f32 + 0.0722 * b as f32) / 255.0;
            let index = (luminance * (LUMINOSITY_RAMP.len() - 1) as f32).round() as usize;
            out.push(LUMINOSITY_RAMP[index.min(LUMINOSITY_RAMP.len() - 1)]);
        }
        out.push('\n');
    }
    out
}

fn format_value(control: Control, value: f32) -> String {
    if control.is_rotation() {
        format!("{value:>6.0}\u{b0}")
    } else {
        format!("{value:>7.2}")
    }
}

fn rgb(pixel: [u8; 4]) -> Color {
    Color::Rgb {
        r: pixel[0],
        g: pixel[1],
        b: pixel[2],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel(editing: Option<&str>, status: Option<&str>) -> Vec<String> {
        let view = PanelView {
            values: Control::ALL
                .iter()
                .map(|&c| (c, if c == Control::Scale { 1.0 } else { 0.0 }))
                .collect(),
            selected: Control::RotateX,
            editing,
            projections_visible: true,
            matrix_text: "[1.000, 0.000]\n[0.000, 1.000]\n",
            status,
        };
        panel_lines(&view)
    }

    #[test]
    fn test_slider_bar_ends_and_middle() {
        assert_eq!(slider_bar(0.0, 5), "o----");
        assert_eq!(slider_bar(1.0, 5), "----o");
        assert_eq!(slider_bar(0.5, 5), "--o--");
        assert_eq!(slider_bar(7.0, 3), "--o");
        assert_eq!(slider_bar(0.5, 0), "");
    }

    #[test]
    fn test_panel_marks_selection_and_values() {
        let lines = panel(None, None);
        let rotate_x = lines.iter().find(|l| l.contains("Rotate X")).unwrap();
        assert!(rotate_x.starts_with('>'));
        assert!(rotate_x.contains("0\u{b0}"));
        // Rotation 0 sits in the middle of a -180..180 slider
        assert!(rotate_x.contains("------o------"));

        let translate_x = lines.iter().find(|l| l.contains("Translate X")).unwrap();
        assert!(translate_x.starts_with(' '));
        assert!(translate_x.contains("0.00"));

        assert!(lines.iter().any(|l| l == "Projections: shown"));
        assert!(lines.iter().any(|l| l == "[1.000, 0.000]"));
    }

    #[test]
    fn test_panel_shows_edit_buffer_and_status() {
        let lines = panel(Some("-4"), Some("Copy failed"));
        let rotate_x = lines.iter().find(|l| l.contains("Rotate X")).unwrap();
        assert!(rotate_x.ends_with("-4_"));
        assert_eq!(lines.last().map(String::as_str), Some("Copy failed"));
    }

    #[test]
    fn test_draw_framebuffer_emits_cells() {
        let mut fb = Framebuffer::new(4, 3);
        fb.clear([1.0, 0.0, 0.0, 1.0]);
        let mut out = Vec::new();
        draw_framebuffer(&mut out, &fb, Rect::new(0, 1, 10, 10)).unwrap();

        let text = String::from_utf8(out).unwrap();
        // Two rows of four cells, clipped to the framebuffer
        assert_eq!(text.matches(HALF_BLOCK).count(), 8);
        // One colour change per row for a flat fill
        assert_eq!(text.matches("38;2;255;0;0").count(), 2);
    }

    #[test]
    fn test_draw_framebuffer_clips_to_rect() {
        let fb = Framebuffer::new(20, 20);
        let mut out = Vec::new();
        draw_framebuffer(&mut out, &fb, Rect::new(0, 0, 3, 2)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches(HALF_BLOCK).count(), 6);
    }

    #[test]
    fn test_ascii_frame_uses_ramp() {
        let mut fb = Framebuffer::new(3, 4);
        fb.clear([1.0, 1.0, 1.0, 1.0]);
        assert_eq!(ascii_frame(&fb), "@@@\n@@@\n");
        fb.clear([0.0, 0.0, 0.0, 1.0]);
        assert_eq!(ascii_frame(&fb), "   \n   \n");
    }
}
