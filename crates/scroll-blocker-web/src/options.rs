#![forbid(unsafe_code)]

//! Parsing of the JS option objects accepted by the exports.
//!
//! - construction: `{ className?, misplacedElements?, styleWritePolicy?, debounceMs? }`
//! - `enable`: `{ breakpoint?, misplacedElements? }`
//! - `disable`: `true`, or `{ force? }`
//!
//! A misplaced element is `{ target, property }` where `target` is an element,
//! a `NodeList`/`HTMLCollection`/array of elements, or a function evaluated at
//! lock time. A function may return element(s), compensated with the entry's
//! `property`, or further `{ target, property }` objects. Targets that resolve
//! to nothing are skipped.

use js_sys::{Array, Function, Reflect};
use scroll_blocker_core::{
    BlockerConfig, BlockerOptions, EnableOptions, LOG_TARGET, MisplacedElement, StyleWritePolicy,
};
use tracing::warn;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlCollection, HtmlElement, NodeList};

use crate::css::{breakpoint_from_number, css_property_name};

type Spec = MisplacedElement<HtmlElement>;

fn present(value: Option<&JsValue>) -> Option<&JsValue> {
    value.filter(|v| !v.is_null() && !v.is_undefined())
}

pub(crate) fn parse_blocker_config(
    options: Option<&JsValue>,
) -> Result<BlockerConfig<HtmlElement>, JsValue> {
    let mut parsed = BlockerOptions::default();
    let Some(obj) = present(options) else {
        return Ok(BlockerConfig::from_options(parsed));
    };
    if let Some(class_name) = get_string_opt(obj, "className")? {
        parsed.class_name = class_name;
    }
    if let Some(policy) = get_string_opt(obj, "styleWritePolicy")? {
        parsed.style_write_policy = parse_policy(&policy)?;
    }
    if let Some(debounce_ms) = get_u32_opt(obj, "debounceMs")? {
        parsed.debounce_ms = u64::from(debounce_ms);
    }
    let misplaced =
        parse_misplaced_list(&Reflect::get(obj, &JsValue::from_str("misplacedElements"))?)?;
    Ok(BlockerConfig::from_options(parsed).with_misplaced_elements(misplaced))
}

pub(crate) fn parse_enable_options(
    options: Option<&JsValue>,
) -> Result<EnableOptions<HtmlElement>, JsValue> {
    let mut parsed = EnableOptions::new();
    let Some(obj) = present(options) else {
        return Ok(parsed);
    };
    let breakpoint = Reflect::get(obj, &JsValue::from_str("breakpoint"))?;
    if let Some(raw) = breakpoint.as_string() {
        parsed = parsed.breakpoint(raw);
    } else if let Some(width) = breakpoint.as_f64() {
        parsed = parsed.breakpoint(breakpoint_from_number(width));
    } else if !breakpoint.is_null() && !breakpoint.is_undefined() {
        return Err(JsValue::from_str("field breakpoint must be a string or number"));
    }
    let misplaced =
        parse_misplaced_list(&Reflect::get(obj, &JsValue::from_str("misplacedElements"))?)?;
    Ok(parsed.misplaced_elements(misplaced))
}

pub(crate) fn parse_force(value: Option<&JsValue>) -> Result<bool, JsValue> {
    let Some(value) = present(value) else {
        return Ok(false);
    };
    if let Some(force) = value.as_bool() {
        return Ok(force);
    }
    if value.is_object() {
        return Ok(get_bool(value, "force")?.unwrap_or(false));
    }
    Err(JsValue::from_str("disable expects a boolean or { force: boolean }"))
}

fn parse_policy(raw: &str) -> Result<StyleWritePolicy, JsValue> {
    match raw {
        "immediate" => Ok(StyleWritePolicy::Immediate),
        "nextFrame" | "next-frame" => Ok(StyleWritePolicy::NextFrame),
        other => Err(JsValue::from_str(&format!(
            "field styleWritePolicy must be \"immediate\" or \"nextFrame\", got {other:?}"
        ))),
    }
}

/// A single spec or an array of specs; `null`/`undefined` entries are dropped.
fn parse_misplaced_list(value: &JsValue) -> Result<Vec<Spec>, JsValue> {
    if value.is_null() || value.is_undefined() {
        return Ok(Vec::new());
    }
    if !Array::is_array(value) {
        return Ok(parse_misplaced_spec(value)?.into_iter().collect());
    }
    let mut out = Vec::new();
    for item in Array::from(value).iter() {
        if let Some(spec) = parse_misplaced_spec(&item)? {
            out.push(spec);
        }
    }
    Ok(out)
}

fn parse_misplaced_spec(value: &JsValue) -> Result<Option<Spec>, JsValue> {
    if value.is_null() || value.is_undefined() {
        return Ok(None);
    }
    if !value.is_object() {
        return Err(JsValue::from_str(
            "misplaced element must be an object with target and property",
        ));
    }
    let target = Reflect::get(value, &JsValue::from_str("target"))?;
    if let Some(producer) = target.dyn_ref::<Function>() {
        let producer = producer.clone();
        let property = get_string_opt(value, "property")?.map(|p| css_property_name(&p));
        return Ok(Some(MisplacedElement::lazy(move || {
            run_producer(&producer, property.as_deref())
        })));
    }
    let property = css_property_name(&get_string(value, "property")?);
    let elements = collect_elements(&target);
    if elements.is_empty() {
        return Ok(None);
    }
    Ok(Some(MisplacedElement::elements(elements, property)))
}

fn run_producer(producer: &Function, property: Option<&str>) -> Vec<Spec> {
    let produced = match producer.call0(&JsValue::NULL) {
        Ok(value) => value,
        Err(err) => {
            warn!(target: LOG_TARGET, error = ?err, "misplaced element producer threw");
            return Vec::new();
        }
    };
    if let Some(property) = property {
        let elements = collect_elements(&produced);
        if !elements.is_empty() {
            return vec![MisplacedElement::elements(elements, property)];
        }
    }
    parse_misplaced_list(&produced).unwrap_or_else(|err| {
        warn!(
            target: LOG_TARGET,
            error = ?err,
            "misplaced element producer returned invalid specs"
        );
        Vec::new()
    })
}

fn collect_elements(value: &JsValue) -> Vec<HtmlElement> {
    if let Some(element) = value.dyn_ref::<HtmlElement>() {
        return vec![element.clone()];
    }
    if let Some(list) = value.dyn_ref::<NodeList>() {
        return (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
            .collect();
    }
    if let Some(collection) = value.dyn_ref::<HtmlCollection>() {
        return (0..collection.length())
            .filter_map(|i| collection.item(i))
            .filter_map(|element| element.dyn_into::<HtmlElement>().ok())
            .collect();
    }
    if Array::is_array(value) {
        return Array::from(value)
            .iter()
            .filter_map(|item| item.dyn_into::<HtmlElement>().ok())
            .collect();
    }
    Vec::new()
}

fn get_string(obj: &JsValue, key: &str) -> Result<String, JsValue> {
    get_string_opt(obj, key)?
        .ok_or_else(|| JsValue::from_str(&format!("missing required string field: {key}")))
}

fn get_string_opt(obj: &JsValue, key: &str) -> Result<Option<String>, JsValue> {
    let v = Reflect::get(obj, &JsValue::from_str(key))?;
    if v.is_null() || v.is_undefined() {
        return Ok(None);
    }
    v.as_string()
        .map(Some)
        .ok_or_else(|| JsValue::from_str(&format!("field {key} must be a string")))
}

fn get_bool(obj: &JsValue, key: &str) -> Result<Option<bool>, JsValue> {
    let v = Reflect::get(obj, &JsValue::from_str(key))?;
    if v.is_null() || v.is_undefined() {
        return Ok(None);
    }
    Ok(Some(v.as_bool().ok_or_else(|| {
        JsValue::from_str(&format!("field {key} must be a boolean"))
    })?))
}

fn get_u32_opt(obj: &JsValue, key: &str) -> Result<Option<u32>, JsValue> {
    let v = Reflect::get(obj, &JsValue::from_str(key))?;
    if v.is_null() || v.is_undefined() {
        return Ok(None);
    }
    let Some(n) = v.as_f64() else {
        return Err(JsValue::from_str(&format!("field {key} must be a number")));
    };
    if n.fract() != 0.0 || n < 0.0 || n > f64::from(u32::MAX) {
        return Err(JsValue::from_str(&format!("field {key} out of range")));
    }
    Ok(Some(n as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    use js_sys::Object;
    use pretty_assertions::assert_eq;
    use scroll_blocker_core::Target;
    use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
    use web_sys::Document;

    wasm_bindgen_test_configure!(run_in_browser);

    fn document() -> Document {
        web_sys::window()
            .and_then(|w| w.document())
            .expect("document")
    }

    fn element(id: &str, class: &str) -> HtmlElement {
        let doc = document();
        let el = doc
            .create_element("div")
            .unwrap()
            .dyn_into::<HtmlElement>()
            .unwrap();
        el.set_id(id);
        el.set_class_name(class);
        doc.body().unwrap().append_child(&el).unwrap();
        el
    }

    fn object(pairs: &[(&str, JsValue)]) -> JsValue {
        let obj = Object::new();
        for (key, value) in pairs {
            Reflect::set(&obj, &JsValue::from_str(key), value).unwrap();
        }
        obj.into()
    }

    /// `(element id, property)` for every target, running producers.
    fn flatten(specs: &[Spec]) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for spec in specs {
            match spec.target() {
                Target::Element(el) => out.push((el.id(), spec.property().to_owned())),
                Target::Elements(list) => out.extend(
                    list.iter()
                        .map(|el| (el.id(), spec.property().to_owned())),
                ),
                Target::Lazy(producer) => out.extend(flatten(&(**producer)())),
            }
        }
        out
    }

    fn pair(id: &str, property: &str) -> (String, String) {
        (id.to_owned(), property.to_owned())
    }

    #[wasm_bindgen_test]
    fn single_element_target_uses_css_property_name() {
        let el = element("opt-single", "opt-single");
        let specs = parse_misplaced_list(&object(&[
            ("target", el.clone().into()),
            ("property", JsValue::from_str("paddingRight")),
        ]))
        .unwrap();
        assert_eq!(flatten(&specs), vec![pair("opt-single", "padding-right")]);
        el.remove();
    }

    #[wasm_bindgen_test]
    fn node_list_collection_and_array_targets_expand() {
        let a = element("opt-list-a", "opt-list");
        let b = element("opt-list-b", "opt-list");
        let doc = document();
        let node_list: JsValue = doc.query_selector_all(".opt-list").unwrap().into();
        let collection: JsValue = doc.get_elements_by_class_name("opt-list").into();
        let array: JsValue = Array::of2(&b, &a).into();

        let specs = parse_misplaced_list(
            &Array::of3(
                &object(&[("target", node_list), ("property", "right".into())]),
                &object(&[("target", collection), ("property", "marginRight".into())]),
                &object(&[("target", array), ("property", "--gutter".into())]),
            )
            .into(),
        )
        .unwrap();
        assert_eq!(flatten(&specs), vec![
            pair("opt-list-a", "right"),
            pair("opt-list-b", "right"),
            pair("opt-list-a", "margin-right"),
            pair("opt-list-b", "margin-right"),
            pair("opt-list-b", "--gutter"),
            pair("opt-list-a", "--gutter"),
        ]);
        a.remove();
        b.remove();
    }

    #[wasm_bindgen_test]
    fn null_targets_and_entries_are_skipped() {
        let specs = parse_misplaced_list(
            &Array::of3(
                &JsValue::NULL,
                &object(&[("target", JsValue::NULL), ("property", "right".into())]),
                &object(&[("target", Array::new().into()), ("property", "right".into())]),
            )
            .into(),
        )
        .unwrap();
        assert!(specs.is_empty());
    }

    #[wasm_bindgen_test]
    fn element_target_without_property_is_rejected() {
        let el = element("opt-noprop", "opt-noprop");
        assert!(parse_misplaced_list(&object(&[("target", el.clone().into())])).is_err());
        assert!(parse_misplaced_list(&JsValue::from_str("header")).is_err());
        el.remove();
    }

    #[wasm_bindgen_test]
    fn producer_elements_take_the_outer_property() {
        let a = element("opt-lazy-a", "opt-lazy");
        let b = element("opt-lazy-b", "opt-lazy");
        let producer = Function::new_no_args("return document.querySelectorAll('.opt-lazy');");
        let specs = parse_misplaced_list(&object(&[
            ("target", producer.into()),
            ("property", "paddingRight".into()),
        ]))
        .unwrap();
        assert_eq!(flatten(&specs), vec![
            pair("opt-lazy-a", "padding-right"),
            pair("opt-lazy-b", "padding-right"),
        ]);
        a.remove();
        b.remove();
    }

    #[wasm_bindgen_test]
    fn producer_specs_keep_their_own_property() {
        let el = element("opt-nested", "opt-nested");
        let producer = Function::new_no_args(
            "return [{ target: document.getElementById('opt-nested'), property: 'marginRight' }];",
        );
        let specs = parse_misplaced_list(&object(&[
            ("target", producer.into()),
            ("property", "right".into()),
        ]))
        .unwrap();
        assert_eq!(flatten(&specs), vec![pair("opt-nested", "margin-right")]);
        el.remove();
    }

    #[wasm_bindgen_test]
    fn throwing_producer_yields_nothing() {
        let producer = Function::new_no_args("throw new Error('not mounted');");
        let specs = parse_misplaced_list(&object(&[("target", producer.into())])).unwrap();
        assert!(flatten(&specs).is_empty());
    }

    #[wasm_bindgen_test]
    fn breakpoint_accepts_string_or_number() {
        let number = object(&[("breakpoint", JsValue::from_f64(800.0))]);
        assert!(parse_enable_options(Some(&number)).is_ok());
        let string = object(&[("breakpoint", JsValue::from_str("50em"))]);
        assert!(parse_enable_options(Some(&string)).is_ok());
        let bad = parse_enable_options(Some(&object(&[("breakpoint", JsValue::TRUE)])));
        assert!(bad.is_err());
    }
}
