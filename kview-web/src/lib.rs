/// kview web front end
///
/// Draws each viewport on the CPU and blits it into its `<canvas>` with a 2D
/// context. The host page wires its sliders and buttons to [`WebApp`].
use kview_core::{
    Clipboard, Control, Controller, Geometry, MultiViewRenderer, RenderTarget, ViewError,
    ViewKind, ViewerConfig,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlDocument, HtmlTextAreaElement,
    ImageData,
};

mod console;

/// Element that receives the formatted matrix
const MATRIX_OUTPUT_ID: &str = "matrixOutput";

struct Canvas {
    kind: ViewKind,
    element: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

#[wasm_bindgen]
pub struct WebApp {
    controller: Controller,
    canvases: Vec<Canvas>,
    document: Document,
    presented: bool,
}

#[wasm_bindgen]
impl WebApp {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WebApp, JsValue> {
        Self::attach(false)
    }

    /// Find the view canvases in the page and draw the first frame.
    /// Views whose canvas is missing or has no 2D context are skipped.
    pub fn attach(wireframe: bool) -> Result<WebApp, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document available"))?;

        let config = ViewerConfig::default();
        let mut canvases = Vec::new();
        let mut targets = Vec::new();
        for kind in ViewKind::ALL {
            match lookup_canvas(&document, kind) {
                Ok(canvas) => {
                    let (width, height) = (canvas.element.width(), canvas.element.height());
                    targets.push(RenderTarget::new(kind, width as usize, height as usize));
                    canvases.push(canvas);
                }
                Err(e @ ViewError::MissingViewport(_)) => log::warn!("{e}, skipping"),
                Err(e) => log::error!("{e}, skipping"),
            }
        }

        let geometry = if wireframe {
            Geometry::wireframe(&config)
        } else {
            Geometry::solid(&config)
        };
        let renderer = MultiViewRenderer::new(&config, &targets);

        let mut app = WebApp {
            controller: Controller::new(geometry, renderer),
            canvases,
            document,
            presented: false,
        };
        app.render()?;
        Ok(app)
    }

    /// Slider input. Returns the stored value.
    pub fn set_control(&mut self, name: &str, value: f32) -> Result<f32, JsValue> {
        let control = control_for(name)?;
        Ok(self.controller.set(control, value))
    }

    /// Number-field input. Invalid text leaves the transform untouched.
    pub fn submit_control_text(&mut self, name: &str, text: &str) -> Result<f32, JsValue> {
        let control = control_for(name)?;
        self.controller.submit_text(control, text).map_err(to_js)
    }

    pub fn nudge_control(&mut self, name: &str, steps: i32) -> Result<f32, JsValue> {
        let control = control_for(name)?;
        Ok(self.controller.nudge(control, steps))
    }

    pub fn control_value(&self, name: &str) -> Result<f32, JsValue> {
        Ok(self.controller.value(control_for(name)?))
    }

    pub fn toggle_projections(&mut self) -> bool {
        self.controller.toggle_projections()
    }

    pub fn reset(&mut self) {
        self.controller.reset();
    }

    pub fn reset_camera(&mut self) {
        self.controller.reset_camera();
    }

    /// Orbit the main camera by yaw and pitch, in radians
    pub fn orbit_camera(&mut self, d_yaw: f32, d_pitch: f32) {
        self.controller.orbit_camera(d_yaw, d_pitch);
    }

    pub fn zoom_camera(&mut self, factor: f32) {
        self.controller.zoom_camera(factor);
    }

    /// Resize a view's canvas and its render target
    pub fn resize(&mut self, view: &str, width: u32, height: u32) -> Result<(), JsValue> {
        let kind = view_for(view)?;
        self.controller
            .resize_viewport(kind, width as usize, height as usize)
            .map_err(to_js)?;
        if let Some(canvas) = self.canvases.iter().find(|c| c.kind == kind) {
            canvas.element.set_width(width);
            canvas.element.set_height(height);
        }
        self.presented = false;
        Ok(())
    }

    pub fn matrix_text(&self) -> String {
        self.controller.matrix_text().to_string()
    }

    /// Copy the matrix text. Failures are shown to the user and return false.
    pub fn copy_matrix(&mut self) -> bool {
        let mut clipboard = DomClipboard {
            document: &self.document,
        };
        match self.controller.copy_matrix(&mut clipboard) {
            Ok(_) => true,
            Err(e) => {
                log::error!("{e}");
                if let Some(window) = web_sys::window() {
                    // Nothing more to do if the alert itself fails
                    let _ = window.alert_with_message(&format!("Could not copy the matrix: {e}"));
                }
                false
            }
        }
    }

    /// Run a pass if anything changed and blit every canvas
    pub fn render(&mut self) -> Result<(), JsValue> {
        if !self.controller.flush() && self.presented {
            return Ok(());
        }

        for canvas in &self.canvases {
            let Some(viewport) = self.controller.renderer().viewport(canvas.kind) else {
                continue;
            };
            let fb = viewport.framebuffer();
            let image = ImageData::new_with_u8_clamped_array_and_sh(
                Clamped(fb.pixels()),
                fb.width() as u32,
                fb.height() as u32,
            )?;
            canvas.context.put_image_data(&image, 0.0, 0.0)?;
        }

        if let Some(output) = self.document.get_element_by_id(MATRIX_OUTPUT_ID) {
            output.set_text_content(Some(self.controller.matrix_text()));
        }
        self.presented = true;
        Ok(())
    }
}

/// Clipboard backed by a hidden textarea and the `copy` command
struct DomClipboard<'a> {
    document: &'a Document,
}

impl Clipboard for DomClipboard<'_> {
    fn set_text(&mut self, text: &str) -> kview_core::Result<()> {
        let fail = |e: JsValue| ViewError::Clipboard(format!("{e:?}"));

        let textarea = self
            .document
            .create_element("textarea")
            .map_err(fail)?
            .dyn_into::<HtmlTextAreaElement>()
            .map_err(|_| ViewError::Clipboard("could not create a textarea".to_string()))?;
        textarea.set_value(text);
        textarea
            .set_attribute("style", "position:fixed;top:0;left:0;opacity:0")
            .map_err(fail)?;

        let body = self
            .document
            .body()
            .ok_or_else(|| ViewError::Clipboard("document has no body".to_string()))?;
        body.append_child(&textarea).map_err(fail)?;
        textarea.select();

        let copied = match self.document.dyn_ref::<HtmlDocument>() {
            Some(html) => html.exec_command("copy").map_err(fail),
            None => Err(ViewError::Clipboard("not an HTML document".to_string())),
        };
        textarea.remove();

        if copied? {
            Ok(())
        } else {
            Err(ViewError::Clipboard("copy command was rejected".to_string()))
        }
    }
}

fn lookup_canvas(document: &Document, kind: ViewKind) -> kview_core::Result<Canvas> {
    let id = kind.element_id();
    let unavailable = |reason: &str| ViewError::ContextUnavailable {
        view: id.to_string(),
        reason: reason.to_string(),
    };

    let element = document
        .get_element_by_id(id)
        .ok_or_else(|| ViewError::MissingViewport(id.to_string()))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| unavailable("element is not a canvas"))?;
    let context = element
        .get_context("2d")
        .map_err(|_| unavailable("getContext failed"))?
        .ok_or_else(|| unavailable("2d context not supported"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| unavailable("unexpected context type"))?;

    Ok(Canvas {
        kind,
        element,
        context,
    })
}

fn control_for(name: &str) -> Result<Control, JsValue> {
    Control::from_element_id(name)
        .ok_or_else(|| JsValue::from_str(&format!("unknown control: {name}")))
}

fn view_for(name: &str) -> Result<ViewKind, JsValue> {
    ViewKind::ALL
        .into_iter()
        .find(|kind| kind.element_id() == name)
        .ok_or_else(|| to_js(ViewError::MissingViewport(name.to_string())))
}

fn to_js(error: ViewError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

#[wasm_bindgen(start)]
pub fn main() {
    console::init(log::LevelFilter::Info);
}
