/// Placement of viewports and the control panel on the terminal grid
use kview_core::ViewKind;

/// Width of the control panel, in cells
pub const PANEL_WIDTH: u16 = 44;
/// Rows reserved for the title bar
pub const TITLE_ROWS: u16 = 1;

/// A rectangle of terminal cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Framebuffer size behind this rect: one pixel per column, two per row
    pub fn pixel_size(&self) -> (usize, usize) {
        (self.width as usize, self.height as usize * 2)
    }
}

/// Where each viewport and the panel go
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub views: Vec<(ViewKind, Rect)>,
    pub panel: Option<Rect>,
}

impl Layout {
    /// A 2x2 grid of views with the panel on the right, or the main view
    /// alone when `fullscreen` is set
    pub fn compute(cols: u16, rows: u16, fullscreen: bool) -> Self {
        let body_rows = rows.saturating_sub(TITLE_ROWS);
        if fullscreen {
            return Self {
                views: vec![(ViewKind::Main, Rect::new(0, TITLE_ROWS, cols, body_rows))],
                panel: None,
            };
        }

        let panel_width = PANEL_WIDTH.min(cols / 2);
        let grid_width = cols - panel_width;
        let (half_w, half_h) = (grid_width / 2, body_rows / 2);

        let views = ViewKind::ALL
            .iter()
            .enumerate()
            .map(|(i, &kind)| {
                let (col, row) = (i as u16 % 2, i as u16 / 2);
                let rect = Rect::new(col * half_w, TITLE_ROWS + row * half_h, half_w, half_h);
                (kind, rect)
            })
            .collect();

        Self {
            views,
            panel: Some(Rect::new(grid_width, TITLE_ROWS, panel_width, body_rows)),
        }
    }

    pub fn rect(&self, kind: ViewKind) -> Option<Rect> {
        self.views.iter().find(|(k, _)| *k == kind).map(|(_, r)| *r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_layout() {
        let layout = Layout::compute(120, 40, false);
        assert_eq!(layout.rect(ViewKind::Main), Some(Rect::new(0, 1, 38, 19)));
        assert_eq!(layout.rect(ViewKind::Xy), Some(Rect::new(38, 1, 38, 19)));
        assert_eq!(layout.rect(ViewKind::Xz), Some(Rect::new(0, 20, 38, 19)));
        assert_eq!(layout.rect(ViewKind::Yz), Some(Rect::new(38, 20, 38, 19)));
        assert_eq!(layout.panel, Some(Rect::new(76, 1, 44, 39)));
        assert_eq!(Rect::new(0, 1, 38, 19).pixel_size(), (38, 38));
    }

    #[test]
    fn test_fullscreen_layout() {
        let layout = Layout::compute(100, 30, true);
        assert_eq!(layout.views.len(), 1);
        assert_eq!(layout.rect(ViewKind::Main), Some(Rect::new(0, 1, 100, 29)));
        assert!(layout.panel.is_none());
    }

    #[test]
    fn test_tiny_terminal_does_not_underflow() {
        let layout = Layout::compute(3, 1, false);
        assert!(layout.views.iter().all(|(_, r)| r.height == 0));
        assert_eq!(layout.panel.map(|p| p.width), Some(1));
    }
}
