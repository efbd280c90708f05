#![forbid(unsafe_code)]

//! Normalisation of CSS values coming from JavaScript callers.

use scroll_blocker_core::Breakpoint;

/// Convert a JS-style property name (`marginRight`) to its CSS form
/// (`margin-right`). Names already in CSS form are returned unchanged, as are
/// custom properties (`--gutter`).
#[must_use]
pub fn css_property_name(name: &str) -> String {
    let name = name.trim();
    if name.starts_with("--") {
        return name.to_owned();
    }
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Breakpoint string for a numeric JS breakpoint (`800` becomes `"800px"`).
#[must_use]
pub fn breakpoint_from_number(value: f64) -> String {
    Breakpoint::from_px(value).as_str().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn camel_case_becomes_kebab_case() {
        assert_eq!(css_property_name("marginRight"), "margin-right");
        assert_eq!(css_property_name("paddingInlineEnd"), "padding-inline-end");
    }

    #[test]
    fn css_names_pass_through() {
        assert_eq!(css_property_name("margin-right"), "margin-right");
        assert_eq!(css_property_name(" right "), "right");
        assert_eq!(css_property_name("--scrollbarGap"), "--scrollbarGap");
    }

    #[test]
    fn vendor_prefixed_camel_case() {
        assert_eq!(css_property_name("WebkitMarginEnd"), "-webkit-margin-end");
    }

    #[test]
    fn numeric_breakpoints_get_px_unit() {
        assert_eq!(breakpoint_from_number(800.0), "800px");
        assert_eq!(breakpoint_from_number(767.5), "767.5px");
    }
}
