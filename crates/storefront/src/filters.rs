//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Capitalizes the first letter of each word.
///
/// The demo catalog's categories are lowercase ("men's clothing");
/// this renders them as display labels.
///
/// Usage in templates: `{{ product.category|titlecase }}`
#[askama::filter_fn]
pub fn titlecase(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let text = value.to_string();
    let mut result = String::with_capacity(text.len());

    for (i, word) in text.split(' ').enumerate() {
        if i > 0 {
            result.push(' ');
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            result.extend(first.to_uppercase());
            result.push_str(chars.as_str());
        }
    }

    Ok(result)
}

/// Percent-encodes a value for use in a URL query string.
///
/// Usage in templates: `href="/products?category={{ category|query_escape }}"`
#[askama::filter_fn]
pub fn query_escape(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(urlencoding::encode(&value.to_string()).into_owned())
}
