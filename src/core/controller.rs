/// Keys and pointer buttons the orbit controls react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Shift,
    MouseLeft,
    MouseMiddle,
    MouseRight,
}

/// Source of held-button state, polled once per frame
pub trait Controller {
    fn is_down(&self, button: Button) -> bool;

    /// Buttons held right now, in press order
    fn get_down_keys(&self) -> &[Button];

    /// -1, 0 or 1 depending on which of two opposing buttons is held.
    /// Holding both cancels out.
    fn axis(&self, negative: Button, positive: Button) -> f32 {
        match (self.is_down(negative), self.is_down(positive)) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}
