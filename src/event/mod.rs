pub mod pointer;

pub use pointer::{PointerButton, PointerEvent, PointerEventKind, PointerSource};

use crate::scene::Viewport;

/// A generic input event delivered to a running animation.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// A pointer (mouse or touch) event in viewport pixels.
    Pointer(PointerEvent),
    /// The viewport was resized to the given dimensions.
    Resize(Viewport),
}

/// Kinds of input an animation subscribes to.
///
/// Each kind maps to a fixed set of DOM event types, see
/// [`InputKind::event_types`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    /// Mouse movement, presses and the pointer leaving the window.
    Mouse,
    /// Touch movement and touch start.
    Touch,
    /// Window resize.
    Resize,
}

impl InputKind {
    /// All input kinds, in registration order.
    pub const ALL: [InputKind; 3] = [InputKind::Mouse, InputKind::Touch, InputKind::Resize];

    /// Returns the DOM event types that this kind listens for.
    pub fn event_types(self) -> &'static [&'static str] {
        match self {
            InputKind::Mouse => &["mousemove", "mousedown", "mouseup", "mouseleave"],
            InputKind::Touch => &["touchmove", "touchstart"],
            InputKind::Resize => &["resize"],
        }
    }
}
