use std::rc::Rc;

use js_sys::{Array, Promise, Reflect};
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::Element;

use vizij_css_animator_core::{
    AnimatorConfig, AnimatorError, CssAnimator, Phase, SequenceStep, VendorResolver,
};

mod host;
mod vendor;

pub use host::DomHost;
pub use vendor::detect_prefix;

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn to_js(err: AnimatorError) -> JsValue {
    JsError::new(&err.to_string()).into()
}

fn rejected(err: AnimatorError) -> Promise {
    Promise::reject(&to_js(err))
}

fn as_element(value: JsValue, phase: Phase) -> Result<Element, AnimatorError> {
    value.dyn_into::<Element>().map_err(|_| AnimatorError::InvalidElement {
        operation: phase.name(),
    })
}

fn parse_config(config: JsValue) -> Result<AnimatorConfig, JsError> {
    if jsvalue_is_undefined_or_null(&config) {
        Ok(AnimatorConfig::default())
    } else {
        swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))
    }
}

fn parse_steps(steps: &JsValue) -> Result<Vec<SequenceStep<Element>>, JsValue> {
    if !Array::is_array(steps) {
        return Err(JsError::new("runSequence expects an array of steps").into());
    }
    let mut parsed = Vec::new();
    for (i, step) in Array::from(steps).iter().enumerate() {
        let element = Reflect::get(&step, &JsValue::from_str("element"))
            .map_err(|_| JsError::new(&format!("runSequence step {i}: unreadable")))?;
        let class_name = Reflect::get(&step, &JsValue::from_str("className"))
            .ok()
            .and_then(|v| v.as_string())
            .ok_or_else(|| JsError::new(&format!("runSequence step {i}: missing className")))?;
        let el = as_element(element, Phase::Animate).map_err(to_js)?;
        parsed.push(SequenceStep::new(el, class_name));
    }
    Ok(parsed)
}

/// CSS animation lifecycle for DOM elements. Every operation returns a
/// Promise resolving to whether a CSS animation actually ran.
#[wasm_bindgen(js_name = CssAnimator)]
pub struct WasmCssAnimator {
    inner: CssAnimator<DomHost>,
}

#[wasm_bindgen(js_class = CssAnimator)]
impl WasmCssAnimator {
    /// Create an animator bound to the global document. Pass a config object
    /// or undefined/null for defaults.
    /// Example:
    ///   new CssAnimator({ use_animation_done_classes: true })
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<WasmCssAnimator, JsError> {
        console_error_panic_hook::set_once();

        let cfg = parse_config(config)?;
        let host = DomHost::new()?;
        let prefix = detect_prefix(host.document());
        Ok(WasmCssAnimator {
            inner: CssAnimator::new(Rc::new(host), Rc::new(VendorResolver::new(prefix)), cfg),
        })
    }

    pub fn enter(&self, element: JsValue) -> Promise {
        match as_element(element, Phase::Enter) {
            Ok(el) => {
                let done = self.inner.enter(&el);
                future_to_promise(async move { done.await.map(JsValue::from_bool).map_err(to_js) })
            }
            Err(err) => rejected(err),
        }
    }

    pub fn leave(&self, element: JsValue) -> Promise {
        match as_element(element, Phase::Leave) {
            Ok(el) => {
                let done = self.inner.leave(&el);
                future_to_promise(async move { done.await.map(JsValue::from_bool).map_err(to_js) })
            }
            Err(err) => rejected(err),
        }
    }

    #[wasm_bindgen(js_name = addClass)]
    pub fn add_class(
        &self,
        element: JsValue,
        class_name: String,
        suppress_events: Option<bool>,
    ) -> Promise {
        match as_element(element, Phase::AddClass) {
            Ok(el) => {
                let done =
                    self.inner
                        .add_class(&el, &class_name, suppress_events.unwrap_or(false));
                future_to_promise(async move { done.await.map(JsValue::from_bool).map_err(to_js) })
            }
            Err(err) => rejected(err),
        }
    }

    #[wasm_bindgen(js_name = removeClass)]
    pub fn remove_class(
        &self,
        element: JsValue,
        class_name: String,
        suppress_events: Option<bool>,
    ) -> Promise {
        match as_element(element, Phase::RemoveClass) {
            Ok(el) => {
                let done =
                    self.inner
                        .remove_class(&el, &class_name, suppress_events.unwrap_or(false));
                future_to_promise(async move { done.await.map(JsValue::from_bool).map_err(to_js) })
            }
            Err(err) => rejected(err),
        }
    }

    /// Flash `className` on an Element (resolves a boolean) or on every
    /// Element of an Array (resolves an Array of booleans).
    pub fn animate(&self, element: JsValue, class_name: String) -> Promise {
        if Array::is_array(&element) {
            let elements: Result<Vec<Element>, AnimatorError> = Array::from(&element)
                .iter()
                .map(|v| as_element(v, Phase::Animate))
                .collect();
            return match elements {
                Ok(elements) => {
                    let all = self.inner.animate_many(&elements, &class_name);
                    future_to_promise(async move {
                        let verdicts = all.await.map_err(to_js)?;
                        Ok(verdicts
                            .into_iter()
                            .map(JsValue::from_bool)
                            .collect::<Array>()
                            .into())
                    })
                }
                Err(err) => rejected(err),
            };
        }
        match as_element(element, Phase::Animate) {
            Ok(el) => {
                let done = self.inner.animate(&el, &class_name);
                future_to_promise(async move { done.await.map(JsValue::from_bool).map_err(to_js) })
            }
            Err(err) => rejected(err),
        }
    }

    /// Run `[{ element, className }, ...]` one after another. Malformed
    /// steps reject the returned Promise.
    #[wasm_bindgen(js_name = runSequence)]
    pub fn run_sequence(&self, steps: JsValue) -> Promise {
        match parse_steps(&steps) {
            Ok(parsed) => {
                let done = self.inner.run_sequence(parsed);
                future_to_promise(async move { done.await.map(JsValue::from_bool).map_err(to_js) })
            }
            Err(err) => Promise::reject(&err),
        }
    }

    #[wasm_bindgen(getter, js_name = isAnimating)]
    pub fn is_animating(&self) -> bool {
        self.inner.is_animating()
    }

    #[wasm_bindgen(getter)]
    pub fn config(&self) -> Result<JsValue, JsError> {
        swb::to_value(&self.inner.config()).map_err(|e| JsError::new(&format!("config error: {e}")))
    }

    #[wasm_bindgen(setter)]
    pub fn set_config(&self, config: JsValue) -> Result<(), JsError> {
        self.inner.set_config(parse_config(config)?);
        Ok(())
    }
}
