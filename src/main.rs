//! Self-awareness worksheet entry point
//!
//! On the web the page markup provides the controls; this binds them to a
//! [`Worksheet`](self_awareness_worksheet::Worksheet) session:
//! - `[data-field=<key>]` inputs, textareas, selects and radios
//! - `[data-step=<n>]` step cards (highlighted while focused)
//! - `[data-error-for=<key>]` / `[data-feedback-for=<key>]` message slots
//! - `#celebrate`, `#reset`, `#print`, `#export-json`, `#export-text` buttons
//! - `#toast` and `#cheer` overlays

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        Document, Element, Event, EventTarget, HtmlButtonElement, HtmlInputElement,
        HtmlSelectElement, HtmlTextAreaElement,
    };

    use self_awareness_worksheet::export::{self, ExportKind};
    use self_awareness_worksheet::platform::{self, BrowserStorage};
    use self_awareness_worksheet::validation;
    use self_awareness_worksheet::{PersistenceStore, ScoreField, Step, TextField, Worksheet};

    type App = Rc<RefCell<Worksheet<BrowserStorage>>>;

    /// How often toast/overlay deadlines are checked
    const TICK_INTERVAL_MS: i32 = 250;

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Self-awareness worksheet starting...");

        let document = web_sys::window()
            .and_then(|w| w.document())
            .expect("no document");

        let store = PersistenceStore::new(BrowserStorage::open());
        let app: App = Rc::new(RefCell::new(Worksheet::mount(store)));

        fill_controls(&document, &app.borrow());
        render_status(&document, &app.borrow());

        setup_field_handlers(&document, app.clone());
        setup_buttons(&document, app.clone());
        setup_ticker(app);

        log::info!("Worksheet ready");
    }

    fn elements(document: &Document, selector: &str) -> Vec<Element> {
        let Ok(list) = document.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn set_hidden(el: &Element, hidden: bool) {
        let _ = el.class_list().toggle_with_force("hidden", hidden);
    }

    /// Write one value into every control bound to `key`
    fn fill_control(document: &Document, key: &str, value: &str) {
        for el in elements(document, &format!("[data-field=\"{}\"]", key)) {
            if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
                if input.type_() == "radio" {
                    input.set_checked(input.value() == value);
                } else {
                    input.set_value(value);
                }
            } else if let Some(area) = el.dyn_ref::<HtmlTextAreaElement>() {
                area.set_value(value);
            } else if let Some(select) = el.dyn_ref::<HtmlSelectElement>() {
                select.set_value(value);
            }
        }
    }

    /// Push the session's answers into the form controls
    fn fill_controls(document: &Document, ws: &Worksheet<BrowserStorage>) {
        let data = ws.data();
        for field in TextField::ALL {
            fill_control(document, field.key(), data.text(field));
        }
        for field in ScoreField::ALL {
            let value = data.score(field).map(|s| s.to_string()).unwrap_or_default();
            fill_control(document, field.key(), &value);
        }
    }

    /// Update messages, highlights, buttons and overlays
    fn render_status(document: &Document, ws: &Worksheet<BrowserStorage>) {
        for field in TextField::ALL {
            let issue = ws.text_issue(field);
            for el in elements(document, &format!("[data-error-for=\"{}\"]", field.key())) {
                el.set_text_content(issue.map(|i| i.message()).as_deref());
                set_hidden(&el, issue.is_none());
            }
            let feedback = validation::feedback(ws.data().text(field));
            for el in elements(document, &format!("[data-feedback-for=\"{}\"]", field.key())) {
                el.set_text_content(feedback);
                set_hidden(&el, feedback.is_none());
            }
        }
        for field in ScoreField::ALL {
            let issue = ws.score_issue(field);
            for el in elements(document, &format!("[data-error-for=\"{}\"]", field.key())) {
                el.set_text_content(issue.map(|i| i.message()).as_deref());
                set_hidden(&el, issue.is_none());
            }
        }

        let active = ws.active_step().map(|s| s.number());
        for el in elements(document, "[data-step]") {
            let step = el.get_attribute("data-step").and_then(|s| s.parse::<u8>().ok());
            let _ = el
                .class_list()
                .toggle_with_force("active", step.is_some() && step == active);
        }

        if let Some(button) = document
            .get_element_by_id("celebrate")
            .and_then(|el| el.dyn_into::<HtmlButtonElement>().ok())
        {
            button.set_disabled(!ws.can_celebrate());
        }

        if let Some(el) = document.get_element_by_id("toast") {
            el.set_text_content(ws.toast().message());
            set_hidden(&el, ws.toast().message().is_none());
            let _ = el.class_list().toggle_with_force("visible", ws.toast_visible());
        }

        if let Some(el) = document.get_element_by_id("cheer") {
            set_hidden(&el, !ws.cheer_visible());
        }
    }

    /// Field key and current value of the control that fired an event
    fn control_value(target: &EventTarget) -> Option<(String, String)> {
        let el = target.dyn_ref::<Element>()?;
        let key = el.get_attribute("data-field")?;
        let value = if let Some(input) = target.dyn_ref::<HtmlInputElement>() {
            if input.type_() == "radio" && !input.checked() {
                return None;
            }
            input.value()
        } else if let Some(area) = target.dyn_ref::<HtmlTextAreaElement>() {
            area.value()
        } else if let Some(select) = target.dyn_ref::<HtmlSelectElement>() {
            select.value()
        } else {
            return None;
        };
        Some((key, value))
    }

    fn add_listener(target: &EventTarget, event: &str, handler: impl FnMut(Event) + 'static) {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        let _ = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_field_handlers(document: &Document, app: App) {
        for event in ["input", "change"] {
            let app = app.clone();
            let doc = document.clone();
            add_listener(document, event, move |e: Event| {
                let Some((key, value)) = e.target().as_ref().and_then(control_value) else {
                    return;
                };
                let now = platform::now_ms();
                if let Err(err) = app.borrow_mut().set_field(&key, &value, now) {
                    log::warn!("Ignored input: {}", err);
                }
                render_status(&doc, &app.borrow());
            });
        }

        // Highlight the step being edited
        {
            let app = app.clone();
            let doc = document.clone();
            add_listener(document, "focusin", move |e: Event| {
                let step = e
                    .target()
                    .and_then(|t| t.dyn_into::<Element>().ok())
                    .and_then(|el| el.closest("[data-step]").ok().flatten())
                    .and_then(|el| el.get_attribute("data-step"))
                    .and_then(|s| s.parse::<u8>().ok())
                    .and_then(Step::from_number);
                if let Some(step) = step {
                    app.borrow_mut().focus_step(step);
                    render_status(&doc, &app.borrow());
                }
            });
        }

        // Errors appear once a field has been left
        {
            let doc = document.clone();
            add_listener(document, "focusout", move |e: Event| {
                let key = e
                    .target()
                    .and_then(|t| t.dyn_into::<Element>().ok())
                    .and_then(|el| el.get_attribute("data-field"));
                if let Some(key) = key {
                    app.borrow_mut().touch(&key);
                    render_status(&doc, &app.borrow());
                }
            });
        }
    }

    fn on_click(document: &Document, id: &str, handler: impl FnMut(Event) + 'static) {
        match document.get_element_by_id(id) {
            Some(el) => add_listener(&el, "click", handler),
            None => log::warn!("Missing #{} button", id),
        }
    }

    fn export(app: &App, kind: ExportKind) {
        let ws = app.borrow();
        let contents = match kind {
            ExportKind::Json => match export::export_json(ws.data()) {
                Ok(json) => json,
                Err(e) => {
                    log::error!("Failed to export JSON: {}", e);
                    return;
                }
            },
            ExportKind::Text => export::export_text(ws.data()),
        };
        let filename = export::export_filename(kind, &platform::today());
        if let Err(e) = export::download(kind, &filename, &contents) {
            log::error!("Download failed: {:?}", e);
        }
    }

    fn setup_buttons(document: &Document, app: App) {
        {
            let app = app.clone();
            let doc = document.clone();
            on_click(document, "celebrate", move |_| {
                app.borrow_mut().celebrate(platform::now_ms());
                render_status(&doc, &app.borrow());
            });
        }
        {
            let app = app.clone();
            let doc = document.clone();
            on_click(document, "reset", move |_| {
                app.borrow_mut().reset(platform::now_ms());
                fill_controls(&doc, &app.borrow());
                render_status(&doc, &app.borrow());
            });
        }
        on_click(document, "print", |_| {
            if let Some(window) = web_sys::window() {
                let _ = window.print();
            }
        });
        {
            let app = app.clone();
            on_click(document, "export-json", move |_| export(&app, ExportKind::Json));
        }
        on_click(document, "export-text", move |_| export(&app, ExportKind::Text));
    }

    fn setup_ticker(app: App) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };
        let closure = Closure::<dyn FnMut()>::new(move || {
            app.borrow_mut().tick(platform::now_ms());
            render_status(&document, &app.borrow());
        });
        let _ = window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            TICK_INTERVAL_MS,
        );
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_app::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Self-awareness worksheet (native) starting...");
    log::info!("The worksheet runs in the browser - build for wasm32 and serve with `trunk serve`");

    println!("\nMigrating a first-release save...");
    migrate_legacy_save();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn migrate_legacy_save() {
    use self_awareness_worksheet::consts::STORAGE_KEY;
    use self_awareness_worksheet::export::export_text;
    use self_awareness_worksheet::{LoadSource, MemoryStorage, PersistenceStore, Worksheet};

    let legacy = r#"{"step1Scene":"夜眠れなかった","step1Feelings":"不安","step4Name":"あおい"}"#;
    let store = PersistenceStore::new(MemoryStorage::with_item(STORAGE_KEY, legacy));
    let ws = Worksheet::mount(store);

    assert_eq!(ws.restored_from(), LoadSource::Legacy, "Legacy save should load");
    assert_eq!(ws.data().step1_intensity, None);
    println!("{}", export_text(ws.data()));
    println!("✓ Legacy save migrated!");
}
