//! # vitrine demo
//!
//! Mounts the stored theme behind the page in `index.html`. The theme button
//! cycles through every theme, the resume button downloads the resume and
//! opening an image is remembered across visits. Returning visitors get a
//! denser, hue-shifted galaxy.
//!
//! Run with `trunk serve` from this directory.

use std::{cell::RefCell, rc::Rc};

use vitrine::{
    backend::BrowserSurfaces,
    download::{download_resume, Asset},
    memory::VisitMemory,
    utils::{set_document_title, set_page_background},
    BrowserHost, KeyValueStore, LocalStorage, MemoryStore, Stage, Theme,
};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, HtmlImageElement, MouseEvent};

type Store = Rc<dyn KeyValueStore>;

fn main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();

    let host = BrowserHost::new()?;
    let store = open_store();

    let mut memory = VisitMemory::new(store.clone(), host.clone());
    memory.init(js_sys::Date::now())?;
    let stage = Stage::new(host, store, BrowserSurfaces::new().content_id("content"))
        .tune(memory.tuner());
    let memory = Rc::new(RefCell::new(memory));
    let stage = Rc::new(RefCell::new(stage));
    let theme = stage.borrow_mut().restore()?;
    show(theme)?;

    on_click("theme-toggle", move |_| {
        let toggled = stage.borrow_mut().toggle();
        match toggled.and_then(show) {
            Ok(()) => {}
            Err(e) => log::error!("failed to switch theme: {e}"),
        }
    })?;

    on_click("download", |_| {
        spawn_local(async {
            download_resume(&Asset::resume()).await;
        });
    })?;

    on_click("content", move |event| {
        let Some(image) = event
            .target()
            .and_then(|target| target.dyn_into::<HtmlImageElement>().ok())
        else {
            return;
        };
        let mut memory = memory.borrow_mut();
        match memory.mark_image_visited(&image.src()) {
            Ok(true) => log::info!("chaos factor is now {}", memory.chaos_factor()),
            Ok(false) => {}
            Err(e) => log::warn!("failed to remember {}: {e}", image.src()),
        }
    })?;

    Ok(())
}

fn open_store() -> Store {
    match LocalStorage::new() {
        Ok(storage) => Rc::new(storage),
        Err(e) => {
            log::warn!("{e}, choices will not survive a reload");
            Rc::new(MemoryStore::new())
        }
    }
}

fn show(theme: Theme) -> Result<(), vitrine::error::Error> {
    let entry = theme.entry();
    set_page_background(entry.page)?;
    set_document_title(&format!("vitrine · {}", entry.label))?;
    if let Some(button) = element("theme-toggle") {
        button.set_text_content(Some(entry.label));
    }
    Ok(())
}

fn element(id: &str) -> Option<Element> {
    web_sys::window()?.document()?.get_element_by_id(id)
}

fn on_click(id: &str, handler: impl FnMut(MouseEvent) + 'static) -> Result<(), JsValue> {
    let element = element(id).ok_or_else(|| JsValue::from_str(&format!("missing #{id}")))?;
    let closure = Closure::<dyn FnMut(MouseEvent)>::new(handler);
    element.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    // Listeners live as long as the page.
    closure.forget();
    Ok(())
}
