/// kview core library - geometry, transform pipeline and multi-view rendering
///
/// This library holds everything the front ends share: the fixed letter K
/// geometry, the transform composer and applicator, cameras, the CPU
/// rasterizer, viewports and the controller that ties them together.
pub mod config;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod geometry;
pub mod matrix_display;
pub mod projection;
pub mod raster;
pub mod transform;
pub mod viewport;

// Re-export commonly used types
pub use config::{LetterDimensions, ViewerConfig};
pub use controller::{AppState, Controller};
pub use debounce::Debouncer;
pub use error::{Result, ViewError};
pub use geometry::{Edge, Geometry, Mesh, Rgba, Shape, Triangle, Vertex, Wireframe};
pub use matrix_display::{export_matrix, format_matrix, Clipboard};
pub use projection::{Camera, ProjectionMode};
pub use raster::{Framebuffer, LambertProgram};
pub use transform::{Control, Transform, TransformParameters};
pub use viewport::{MultiViewRenderer, RenderTarget, ViewKind, Viewport};
