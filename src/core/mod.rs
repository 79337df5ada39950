pub mod clock;
pub mod controller;
pub mod frame;
pub mod input_adapter;
pub mod loop_control;
pub mod window;

pub use clock::Clock;
pub use controller::{Button, Controller};
pub use frame::{FpsCounter, FrameInfo};
pub use input_adapter::WinitController;
pub use loop_control::{LoopHandle, LoopState};
pub use window::{WindowContext, WindowDimensions};
