#![cfg(target_arch = "wasm32")]
use js_sys::{Array, Object, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::Element;

use vizij_css_animator_wasm::{detect_prefix, WasmCssAnimator};

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> web_sys::Document {
    web_sys::window().unwrap().document().unwrap()
}

fn attached_div(classes: &str) -> Element {
    let doc = document();
    let el = doc.create_element("div").unwrap();
    el.set_class_name(classes);
    doc.body().unwrap().append_child(&el).unwrap();
    el
}

#[wasm_bindgen_test]
fn construct_with_defaults() {
    assert!(WasmCssAnimator::new(JsValue::UNDEFINED).is_ok());
    assert!(WasmCssAnimator::new(JsValue::NULL).is_ok());
}

#[wasm_bindgen_test]
fn config_round_trips_through_js() {
    let animator = WasmCssAnimator::new(JsValue::NULL).unwrap();
    let cfg = Object::new();
    Reflect::set(&cfg, &"timeout_grace_ms".into(), &JsValue::from_f64(10.0)).unwrap();
    animator.set_config(cfg.into()).unwrap();

    let back = animator.config().unwrap();
    let grace = Reflect::get(&back, &"timeout_grace_ms".into()).unwrap();
    assert_eq!(grace.as_f64(), Some(10.0));
    let verify = Reflect::get(&back, &"verify_keyframes_exist".into()).unwrap();
    assert_eq!(verify.as_bool(), Some(true));
}

#[wasm_bindgen_test]
fn detects_a_supported_prefix() {
    // any modern engine supports the unprefixed property
    assert_eq!(
        detect_prefix(&document()),
        vizij_css_animator_core::VendorPrefix::None
    );
}

#[wasm_bindgen_test]
async fn enter_without_css_resolves_false() {
    let animator = WasmCssAnimator::new(JsValue::NULL).unwrap();
    let el = attached_div("plain");

    let verdict = JsFuture::from(animator.enter(el.clone().into())).await.unwrap();
    assert_eq!(verdict.as_bool(), Some(false));
    assert_eq!(el.class_name(), "plain");
    assert!(!animator.is_animating());
}

#[wasm_bindgen_test]
async fn add_class_without_css_still_applies_the_class() {
    let animator = WasmCssAnimator::new(JsValue::NULL).unwrap();
    let el = attached_div("plain");

    let verdict = JsFuture::from(animator.add_class(el.clone().into(), "shown".into(), None))
        .await
        .unwrap();
    assert_eq!(verdict.as_bool(), Some(false));
    assert!(el.class_list().contains("shown"));
    assert!(!el.class_list().contains("shown-add"));
}

#[wasm_bindgen_test]
async fn non_elements_are_rejected() {
    let animator = WasmCssAnimator::new(JsValue::NULL).unwrap();
    let err = JsFuture::from(animator.enter(JsValue::from_str("div")))
        .await
        .unwrap_err();
    let message = err.dyn_into::<js_sys::Error>().unwrap().message();
    assert_eq!(String::from(message), "enter requires an Element");
}

#[wasm_bindgen_test]
async fn animate_over_an_array_resolves_an_array() {
    let animator = WasmCssAnimator::new(JsValue::NULL).unwrap();
    let a = attached_div("plain");
    let b = attached_div("plain");
    let elements = Array::of2(&a, &b);

    let verdicts = JsFuture::from(animator.animate(elements.into(), "flash".into()))
        .await
        .unwrap();
    let verdicts = Array::from(&verdicts);
    assert_eq!(verdicts.length(), 2);
    assert_eq!(verdicts.get(0).as_bool(), Some(false));
    assert!(!a.class_list().contains("flash"));
}

#[wasm_bindgen_test]
async fn run_sequence_accepts_step_objects() {
    let animator = WasmCssAnimator::new(JsValue::NULL).unwrap();
    let a = attached_div("plain");
    let step = Object::new();
    Reflect::set(&step, &"element".into(), &a).unwrap();
    Reflect::set(&step, &"className".into(), &"flash".into()).unwrap();

    let verdict = JsFuture::from(animator.run_sequence(Array::of1(&step).into()))
        .await
        .unwrap();
    assert_eq!(verdict.as_bool(), Some(false));
}

#[wasm_bindgen_test]
async fn malformed_sequences_reject() {
    let animator = WasmCssAnimator::new(JsValue::NULL).unwrap();

    let err = JsFuture::from(animator.run_sequence(JsValue::from_str("steps")))
        .await
        .unwrap_err();
    let message = err.dyn_into::<js_sys::Error>().unwrap().message();
    assert_eq!(String::from(message), "runSequence expects an array of steps");

    let step = Object::new();
    Reflect::set(&step, &"element".into(), &attached_div("plain")).unwrap();
    let err = JsFuture::from(animator.run_sequence(Array::of1(&step).into()))
        .await
        .unwrap_err();
    let message = err.dyn_into::<js_sys::Error>().unwrap().message();
    assert_eq!(String::from(message), "runSequence step 0: missing className");
}
