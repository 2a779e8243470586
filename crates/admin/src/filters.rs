//! Askama filters for the back-office templates.

use std::fmt::Display;

use chrono::Datelike;

/// Width of the zero-padded order reference.
const ORDER_REF_WIDTH: usize = 6;

/// Footer year. The input is ignored: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    Ok(chrono::Utc::now().year())
}

/// Order id as staff quote it on the phone: `{{ order.id|order_ref }}` gives `#000042`.
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn order_ref(id: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_order_ref(&id))
}

fn format_order_ref(id: &impl Display) -> String {
    format!("#{:0>ORDER_REF_WIDTH$}", id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_ref_is_padded() {
        assert_eq!(format_order_ref(&42), "#000042");
        assert_eq!(format_order_ref(&1_234_567), "#1234567");
    }
}
