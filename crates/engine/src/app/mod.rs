mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;
mod timer;

pub use input::InputAction;
pub use loop_runner::{run_app, AppError, LoopConfig, SLOW_FRAME_ENV_VAR};
pub use rendering::{text_height_px, text_width_px, Renderer};
pub use scene::{
    ButtonId, DirtyRegion, FrameLabel, FrameOutline, InputSnapshot, Modal, PointPx, RectPx, Scene,
    SceneCommand, SceneWorld, Sprite, UiButton,
};
pub use timer::IntervalTimer;
