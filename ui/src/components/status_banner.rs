use dioxus::prelude::*;

use crate::core::status::StatusLine;

/// Renders a [`StatusLine`]; idle renders nothing.
#[component]
pub fn StatusBanner(status: StatusLine) -> Element {
    let class_name = status.css_class();
    let busy = status.is_working();
    match status.message() {
        Some(message) => rsx! {
            p { class: "{class_name}", role: "status", aria_busy: busy, "{message}" }
        },
        None => rsx! {},
    }
}
