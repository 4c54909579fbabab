mod canvas;
mod renderer;
mod text;

pub use renderer::Renderer;
pub use text::{text_height_px, text_width_px};
