use std::{cell::Cell, rc::Rc};

use web_sys::{
    wasm_bindgen::{closure::Closure, JsCast, JsValue},
    EventTarget, Window,
};

use crate::{
    backend::elements::{get_document, get_window},
    error::Error,
    event::{pointer::from_dom_event, Event, InputKind},
    host::{FrameCallback, FrameRequester, Host, InputCallback, TimerCallback},
    scene::Viewport,
};

/// [`Host`] backed by the browser window.
#[derive(Debug, Clone)]
pub struct BrowserHost {
    window: Window,
}

impl BrowserHost {
    /// Constructs a new [`BrowserHost`] for the global window.
    pub fn new() -> Result<Self, Error> {
        Ok(Self {
            window: get_window()?,
        })
    }

    /// Returns the wrapped window.
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Returns the target that `kind` listeners are attached to.
    ///
    /// Pointer events go to the root element so `mouseleave` fires when the
    /// pointer exits the page; `resize` only fires on the window.
    fn target_for(&self, kind: InputKind) -> Result<EventTarget, Error> {
        match kind {
            InputKind::Resize => Ok(self.window.clone().into()),
            InputKind::Mouse | InputKind::Touch => get_document()?
                .document_element()
                .map(Into::into)
                .ok_or(Error::UnableToRetrieveDocument),
        }
    }
}

impl Host for BrowserHost {
    type Frame = AnimationFrame;
    type Listener = EventCallback;
    type Timer = Interval;

    fn frame(&self, callback: FrameCallback) -> Result<Self::Frame, Error> {
        Ok(AnimationFrame::new(self.window.clone(), callback))
    }

    fn listen(&self, kind: InputKind, callback: InputCallback) -> Result<Self::Listener, Error> {
        EventCallback::new(self.target_for(kind)?, kind, self.window.clone(), callback)
    }

    fn every(&self, period_ms: u32, callback: TimerCallback) -> Result<Self::Timer, Error> {
        Interval::new(self.window.clone(), period_ms, callback)
    }

    fn viewport(&self) -> Viewport {
        window_viewport(&self.window)
    }

    fn now(&self) -> f64 {
        self.window
            .performance()
            .map(|performance| performance.now())
            .unwrap_or_else(js_sys::Date::now)
    }
}

/// Returns the inner size of the window, falling back to the default
/// viewport when it cannot be read.
pub(crate) fn window_viewport(window: &Window) -> Viewport {
    fn js_val_to_u32(value: JsValue) -> Option<u32> {
        value.as_f64().map(|v| v.max(0.0) as u32)
    }

    window
        .inner_width()
        .ok()
        .and_then(js_val_to_u32)
        .zip(window.inner_height().ok().and_then(js_val_to_u32))
        .map(Viewport::from)
        .unwrap_or_default()
}

/// A `requestAnimationFrame` callback with at most one pending request.
#[derive(Debug)]
pub struct AnimationFrame {
    window: Window,
    closure: Closure<dyn FnMut(f64)>,
    handle: Rc<Cell<Option<i32>>>,
}

impl AnimationFrame {
    fn new(window: Window, mut callback: FrameCallback) -> Self {
        let handle = Rc::new(Cell::new(None));
        let closure = Closure::<dyn FnMut(f64)>::new({
            let handle = handle.clone();
            move |timestamp: f64| {
                handle.set(None);
                callback(timestamp);
            }
        });
        Self {
            window,
            closure,
            handle,
        }
    }
}

impl FrameRequester for AnimationFrame {
    fn request(&mut self) -> Result<(), Error> {
        if self.handle.get().is_none() {
            let id = self
                .window
                .request_animation_frame(self.closure.as_ref().unchecked_ref())?;
            self.handle.set(Some(id));
        }
        Ok(())
    }

    fn cancel(&mut self) {
        if let Some(id) = self.handle.take() {
            let _ = self.window.cancel_animation_frame(id);
        }
    }

    fn is_pending(&self) -> bool {
        self.handle.get().is_some()
    }
}

impl Drop for AnimationFrame {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Manages a DOM event listener with automatic cleanup.
///
/// The listener is removed from every event type it was added for when
/// the struct is dropped.
#[derive(Debug)]
pub struct EventCallback {
    event_types: &'static [&'static str],
    target: EventTarget,
    closure: Closure<dyn FnMut(web_sys::Event)>,
}

impl EventCallback {
    fn new(
        target: EventTarget,
        kind: InputKind,
        window: Window,
        mut callback: InputCallback,
    ) -> Result<Self, Error> {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
            let event = match kind {
                InputKind::Resize => Some(Event::Resize(window_viewport(&window))),
                InputKind::Mouse | InputKind::Touch => from_dom_event(event).map(Event::Pointer),
            };
            if let Some(event) = event {
                callback(event);
            }
        });

        let event_types = kind.event_types();
        event_types.iter().try_for_each(|event_type| {
            target
                .add_event_listener_with_callback(event_type, closure.as_ref().unchecked_ref())
                .map_err(Error::from)
        })?;

        Ok(Self {
            event_types,
            target,
            closure,
        })
    }
}

impl Drop for EventCallback {
    fn drop(&mut self) {
        let closure = self.closure.as_ref();
        for event_type in self.event_types {
            let _ = self
                .target
                .remove_event_listener_with_callback(event_type, closure.unchecked_ref());
        }
    }
}

/// A `setInterval` timer, cleared on drop.
#[derive(Debug)]
pub struct Interval {
    window: Window,
    id: i32,
    _closure: Closure<dyn FnMut()>,
}

impl Interval {
    fn new(window: Window, period_ms: u32, mut callback: TimerCallback) -> Result<Self, Error> {
        let closure = Closure::<dyn FnMut()>::new(move || callback());
        let id = window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            period_ms.min(i32::MAX as u32) as i32,
        )?;
        Ok(Self {
            window,
            id,
            _closure: closure,
        })
    }
}

impl Drop for Interval {
    fn drop(&mut self) {
        self.window.clear_interval_with_handle(self.id);
    }
}
