#![forbid(unsafe_code)]

//! `wasm-bindgen` exports. Only compiled on `wasm32` targets.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Reflect;
use scroll_blocker_core::ScrollBlocker;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::dom_host::{DomBlocker, DomHost};
use crate::options::{parse_blocker_config, parse_enable_options, parse_force};

thread_local! {
    static SHARED: RefCell<Option<Rc<RefCell<DomBlocker>>>> = const { RefCell::new(None) };
}

fn console_error(msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(error) = Reflect::get(&console, &"error".into()) else {
        return;
    };
    let Ok(error_fn) = error.dyn_into::<js_sys::Function>() else {
        return;
    };
    let _ = error_fn.call1(&console, &JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("panic: {info}")
            };
            console_error(&msg);
        }));
    });
}

fn create_engine(options: Option<&JsValue>) -> Result<Rc<RefCell<DomBlocker>>, JsValue> {
    let config = parse_blocker_config(options)?;
    let host = DomHost::current()?;
    let blocker =
        ScrollBlocker::new(host, config).map_err(|err| JsValue::from_str(&err.to_string()))?;
    let engine = Rc::new(RefCell::new(blocker));
    engine.borrow_mut().host_mut().bind(Rc::downgrade(&engine));
    Ok(engine)
}

/// Page scroll lock, exported to JS as `ScrollBlocker`.
///
/// Handles returned by [`shared_scroll_blocker`] all point at one engine;
/// `new ScrollBlocker()` creates an independent one.
#[wasm_bindgen(js_name = ScrollBlocker)]
pub struct WebScrollBlocker {
    engine: Rc<RefCell<DomBlocker>>,
}

#[wasm_bindgen(js_class = ScrollBlocker)]
impl WebScrollBlocker {
    #[wasm_bindgen(constructor)]
    pub fn new(options: Option<JsValue>) -> Result<WebScrollBlocker, JsValue> {
        install_panic_hook();
        Ok(Self {
            engine: create_engine(options.as_ref())?,
        })
    }

    /// Request a lock: `enable({ breakpoint?, misplacedElements? })`.
    pub fn enable(&self, options: Option<JsValue>) -> Result<(), JsValue> {
        let options = parse_enable_options(options.as_ref())?;
        self.with_engine(|engine| engine.enable(options))
    }

    /// Release one activation; `disable(true)` or `disable({ force: true })`
    /// releases all of them.
    pub fn disable(&self, force: Option<JsValue>) -> Result<(), JsValue> {
        let force = parse_force(force.as_ref())?;
        self.with_engine(|engine| engine.disable(force))
    }

    #[wasm_bindgen(getter, js_name = isEnabled)]
    pub fn is_enabled(&self) -> bool {
        self.engine
            .try_borrow()
            .is_ok_and(|engine| engine.is_enabled())
    }

    #[wasm_bindgen(getter, js_name = activationCount)]
    pub fn activation_count(&self) -> u32 {
        self.engine
            .try_borrow()
            .map_or(0, |engine| engine.activation_count())
    }

    /// JSON diagnostics snapshot of the engine state.
    #[wasm_bindgen(js_name = snapshotJson)]
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        let engine = self.engine.try_borrow().map_err(|_| busy())?;
        Ok(engine.snapshot().to_json())
    }
}

impl WebScrollBlocker {
    fn with_engine<R>(&self, f: impl FnOnce(&mut DomBlocker) -> R) -> Result<R, JsValue> {
        let mut engine = self.engine.try_borrow_mut().map_err(|_| busy())?;
        Ok(f(&mut engine))
    }
}

fn busy() -> JsValue {
    JsValue::from_str("scroll blocker is busy: re-entrant call during enable/disable")
}

/// The page-wide engine, created on first use.
///
/// `options` only apply to the call that creates the engine.
#[wasm_bindgen(js_name = sharedScrollBlocker)]
pub fn shared_scroll_blocker(options: Option<JsValue>) -> Result<WebScrollBlocker, JsValue> {
    install_panic_hook();
    SHARED.with(|slot| {
        if let Some(engine) = slot.borrow().as_ref() {
            return Ok(WebScrollBlocker {
                engine: Rc::clone(engine),
            });
        }
        let engine = create_engine(options.as_ref())?;
        *slot.borrow_mut() = Some(Rc::clone(&engine));
        Ok(WebScrollBlocker { engine })
    })
}
