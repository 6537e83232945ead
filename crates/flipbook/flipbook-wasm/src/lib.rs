use js_sys::{Function, JSON};
use serde::Serialize;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use flipbook_core::{
    BookBounds, BookCommand, Config, Direction, Engine, InputEvent, Inputs, Outputs,
    PointerEvent,
};

#[wasm_bindgen]
pub struct FlipbookEngine {
    core: Engine,
    listener: Option<Function>,
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn to_js<T: Serialize + ?Sized>(value: &T, what: &str) -> Result<JsValue, JsError> {
    swb::to_value(value).map_err(|e| JsError::new(&format!("{what} error: {e}")))
}

fn parse_direction(direction: &str) -> Result<Direction, JsError> {
    match direction {
        "forward" => Ok(Direction::Forward),
        "backward" => Ok(Direction::Backward),
        other => Err(JsError::new(&format!(
            "direction must be \"forward\" or \"backward\", got {other:?}"
        ))),
    }
}

fn parse_pointer(event: JsValue) -> Result<PointerEvent, JsError> {
    swb::from_value(event).map_err(|e| JsError::new(&format!("pointer parse error: {e}")))
}

#[wasm_bindgen]
impl FlipbookEngine {
    /// Create an engine. Pass a config object (snake_case keys, or the camelCase
    /// aliases) or undefined/null for defaults.
    /// Example:
    ///   new FlipbookEngine({ layout: "double", flickVelocityThreshold: 3 })
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<FlipbookEngine, JsError> {
        console_error_panic_hook::set_once();

        let cfg: Config = if jsvalue_is_undefined_or_null(&config) {
            Config::default()
        } else {
            // Round-trip through JSON so camelCase aliases resolve the same way as in Rust hosts.
            let raw = JSON::stringify(&config)
                .map_err(|e| JsError::new(&format!("config stringify error: {e:?}")))?
                .as_string()
                .ok_or_else(|| JsError::new("config: stringify produced non-string"))?;
            Config::from_json(&raw).map_err(|e| JsError::new(&format!("config error: {e}")))?
        };

        let core = Engine::new(cfg).map_err(|e| JsError::new(&format!("config error: {e}")))?;
        Ok(FlipbookEngine {
            core,
            listener: None,
        })
    }

    /// Load page contents in reading order: an array of strings (image URLs) or nulls.
    #[wasm_bindgen]
    pub fn initialize(&mut self, pages: JsValue) -> Result<(), JsError> {
        let pages: Vec<Option<String>> = swb::from_value(pages)
            .map_err(|e| JsError::new(&format!("initialize parse error: {e}")))?;
        self.core
            .initialize(pages)
            .map_err(|e| JsError::new(&format!("initialize error: {e}")))
    }

    /// Book rectangle in host pixels: `{ left, top, width, height }`.
    #[wasm_bindgen(js_name = set_bounds)]
    pub fn set_bounds(&mut self, bounds: JsValue) -> Result<(), JsError> {
        let bounds: BookBounds = swb::from_value(bounds)
            .map_err(|e| JsError::new(&format!("bounds parse error: {e}")))?;
        self.core
            .set_bounds(bounds)
            .map_err(|e| JsError::new(&format!("bounds error: {e}")))
    }

    /// Register `listener(event)` to be called for each flip event raised by `update`.
    /// Pass undefined/null to remove it.
    #[wasm_bindgen(js_name = set_listener)]
    pub fn set_listener(&mut self, listener: JsValue) -> Result<(), JsError> {
        if jsvalue_is_undefined_or_null(&listener) {
            self.listener = None;
            return Ok(());
        }
        let f = listener
            .dyn_into::<Function>()
            .map_err(|_| JsError::new("set_listener: expected a function"))?;
        self.listener = Some(f);
        Ok(())
    }

    /// Forward one pointer event: `{ type: "pointer_down" | "pointer_move" | "pointer_up" |
    /// "pointer_cancel" | "pointer_leave" | "blur", pointer_id, x, y, timestamp_ms }`.
    #[wasm_bindgen]
    pub fn handle(&mut self, event: JsValue) -> Result<(), JsError> {
        let event: InputEvent = swb::from_value(event)
            .map_err(|e| JsError::new(&format!("event parse error: {e}")))?;
        self.core.handle(event);
        Ok(())
    }

    #[wasm_bindgen(js_name = pointer_down)]
    pub fn pointer_down(&mut self, event: JsValue) -> Result<(), JsError> {
        let ev = parse_pointer(event)?;
        self.core.handle(InputEvent::PointerDown(ev));
        Ok(())
    }

    #[wasm_bindgen(js_name = pointer_move)]
    pub fn pointer_move(&mut self, event: JsValue) -> Result<(), JsError> {
        let ev = parse_pointer(event)?;
        self.core.handle(InputEvent::PointerMove(ev));
        Ok(())
    }

    #[wasm_bindgen(js_name = pointer_up)]
    pub fn pointer_up(&mut self, event: JsValue) -> Result<(), JsError> {
        let ev = parse_pointer(event)?;
        self.core.handle(InputEvent::PointerUp(ev));
        Ok(())
    }

    /// Abort any gesture in flight (pointercancel, pointerleave or window blur).
    #[wasm_bindgen]
    pub fn cancel(&mut self) {
        self.core.cancel_gesture();
    }

    /// Animate a whole flip: `"forward"` or `"backward"`.
    #[wasm_bindgen]
    pub fn flip(&mut self, direction: String) -> Result<(), JsError> {
        let direction = parse_direction(&direction)?;
        self.core
            .command(BookCommand::Flip { direction })
            .map_err(|e| JsError::new(&format!("flip error: {e}")))
    }

    #[wasm_bindgen(js_name = go_to)]
    pub fn go_to(&mut self, spread: u32) -> Result<(), JsError> {
        self.core
            .go_to(spread as usize)
            .map_err(|e| JsError::new(&format!("go_to error: {e}")))
    }

    #[wasm_bindgen(js_name = can_flip)]
    pub fn can_flip(&self, direction: String) -> Result<bool, JsError> {
        Ok(self.core.can_flip(parse_direction(&direction)?))
    }

    /// Advance a settle by `dt_ms` milliseconds.
    #[wasm_bindgen]
    pub fn tick(&mut self, dt_ms: f32) {
        self.core.tick(dt_ms);
    }

    /// Step by `dt_ms` with optional inputs `{ commands, events }`. Returns Outputs JSON.
    #[wasm_bindgen]
    pub fn update(&mut self, dt_ms: f32, inputs_json: JsValue) -> Result<JsValue, JsError> {
        let inputs: Inputs = if jsvalue_is_undefined_or_null(&inputs_json) {
            Inputs::default()
        } else {
            swb::from_value(inputs_json).map_err(|e| JsError::new(&format!("inputs error: {e}")))?
        };
        let out: &Outputs = self.core.update(dt_ms, inputs);
        let js = to_js(out, "outputs")?;
        if let Some(listener) = &self.listener {
            for event in &out.events {
                listener
                    .call1(&JsValue::UNDEFINED, &to_js(event, "event")?)
                    .map_err(|e| JsError::new(&format!("listener error: {e:?}")))?;
            }
        }
        Ok(js)
    }

    /// Render state for the current instant, without advancing time.
    #[wasm_bindgen]
    pub fn snapshot(&self) -> Result<JsValue, JsError> {
        to_js(&self.core.snapshot(), "snapshot")
    }

    /// Flip events raised by `handle`/`flip`/`tick` since the last call.
    #[wasm_bindgen(js_name = drain_events)]
    pub fn drain_events(&mut self) -> Result<JsValue, JsError> {
        let events = self.core.drain_events();
        to_js(&events, "events")
    }

    #[wasm_bindgen(js_name = current_spread)]
    pub fn current_spread(&self) -> Result<JsValue, JsError> {
        to_js(&self.core.current_spread(), "spread")
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
