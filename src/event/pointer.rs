//! Module for `PointerEvent` and related structs.

use web_sys::wasm_bindgen::JsCast;

/// A pointer event, in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// The triggered event.
    pub kind: PointerEventKind,
    /// Where the event came from.
    pub source: PointerSource,
    /// The mouse button, for presses and releases.
    pub button: PointerButton,
    /// The x coordinate of the pointer.
    pub x: f32,
    /// The y coordinate of the pointer.
    pub y: f32,
}

impl PointerEvent {
    /// Constructs a mouse movement event at the given position.
    pub fn moved(x: f32, y: f32) -> Self {
        Self {
            kind: PointerEventKind::Moved,
            source: PointerSource::Mouse,
            button: PointerButton::Unidentified,
            x,
            y,
        }
    }

    /// Constructs a touch movement event at the given position.
    pub fn touched(x: f32, y: f32) -> Self {
        Self {
            source: PointerSource::Touch,
            ..Self::moved(x, y)
        }
    }

    /// Constructs a press of the primary button at the given position.
    pub fn pressed(x: f32, y: f32) -> Self {
        Self {
            kind: PointerEventKind::Pressed,
            button: PointerButton::Primary,
            ..Self::moved(x, y)
        }
    }

    /// Constructs a release of the primary button at the given position.
    pub fn released(x: f32, y: f32) -> Self {
        Self {
            kind: PointerEventKind::Released,
            button: PointerButton::Primary,
            ..Self::moved(x, y)
        }
    }

    /// Constructs an event for the pointer leaving the window.
    pub fn left() -> Self {
        Self {
            kind: PointerEventKind::Left,
            ..Self::moved(0.0, 0.0)
        }
    }

    /// Returns the position as a vector.
    pub fn position(&self) -> glam::Vec2 {
        glam::Vec2::new(self.x, self.y)
    }
}

/// Where a pointer event originated.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PointerSource {
    /// Mouse or pen.
    Mouse,
    /// Touch screen.
    Touch,
}

/// A pointer button.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PointerButton {
    /// Left mouse button or a touch contact.
    Primary,
    /// Middle mouse button.
    Middle,
    /// Right mouse button.
    Secondary,
    /// Unidentified button.
    Unidentified,
}

/// A pointer event kind.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PointerEventKind {
    /// Pointer moved
    Moved,
    /// Button pressed or touch started
    Pressed,
    /// Button released
    Released,
    /// Pointer left the window
    Left,
    /// Unidentified pointer event
    Unidentified,
}

/// Convert a [`web_sys::MouseEvent`] to a [`PointerEvent`].
impl From<web_sys::MouseEvent> for PointerEvent {
    fn from(event: web_sys::MouseEvent) -> Self {
        let kind = PointerEventKind::from(event.type_());
        PointerEvent {
            // Button is only valid if it is a mousedown or mouseup event.
            button: match kind {
                PointerEventKind::Pressed | PointerEventKind::Released => event.button().into(),
                _ => PointerButton::Unidentified,
            },
            kind,
            source: PointerSource::Mouse,
            x: event.client_x() as f32,
            y: event.client_y() as f32,
        }
    }
}

/// Convert the first contact of a [`web_sys::TouchEvent`] to a [`PointerEvent`].
///
/// Returns `None` when the event carries no touches.
pub(crate) fn from_touch_event(event: &web_sys::TouchEvent) -> Option<PointerEvent> {
    let touch = event.touches().item(0)?;
    let kind = match event.type_().as_str() {
        "touchstart" => PointerEventKind::Pressed,
        _ => PointerEventKind::Moved,
    };
    Some(PointerEvent {
        kind,
        source: PointerSource::Touch,
        button: PointerButton::Primary,
        x: touch.client_x() as f32,
        y: touch.client_y() as f32,
    })
}

/// Converts a DOM event of any supported type to a [`PointerEvent`].
pub(crate) fn from_dom_event(event: web_sys::Event) -> Option<PointerEvent> {
    match event.dyn_into::<web_sys::TouchEvent>() {
        Ok(touch) => from_touch_event(&touch),
        Err(event) => event
            .dyn_into::<web_sys::MouseEvent>()
            .ok()
            .map(PointerEvent::from),
    }
}

/// Convert a mouse button index to a [`PointerButton`].
impl From<i16> for PointerButton {
    fn from(button: i16) -> Self {
        match button {
            0 => PointerButton::Primary,
            1 => PointerButton::Middle,
            2 => PointerButton::Secondary,
            _ => PointerButton::Unidentified,
        }
    }
}

/// Convert a DOM event type to a [`PointerEventKind`].
impl From<String> for PointerEventKind {
    fn from(event: String) -> Self {
        match event.as_str() {
            "mousemove" | "touchmove" => PointerEventKind::Moved,
            "mousedown" | "touchstart" => PointerEventKind::Pressed,
            "mouseup" => PointerEventKind::Released,
            "mouseleave" => PointerEventKind::Left,
            _ => PointerEventKind::Unidentified,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_from_type() {
        [
            ("mousemove", PointerEventKind::Moved),
            ("touchmove", PointerEventKind::Moved),
            ("mousedown", PointerEventKind::Pressed),
            ("mouseup", PointerEventKind::Released),
            ("mouseleave", PointerEventKind::Left),
            ("wheel", PointerEventKind::Unidentified),
        ]
        .into_iter()
        .for_each(|(name, kind)| assert_eq!(kind, PointerEventKind::from(name.to_string())));
    }

    #[test]
    fn test_button_from_index() {
        assert_eq!(PointerButton::from(0), PointerButton::Primary);
        assert_eq!(PointerButton::from(2), PointerButton::Secondary);
        assert_eq!(PointerButton::from(7), PointerButton::Unidentified);
    }
}
