use dioxus::prelude::*;

use crate::tasks::topics::TopicsView;

#[component]
pub fn Topics() -> Element {
    // Reading the global language signal keeps this page in step with the
    // navbar's language switcher.
    let lang_code: Option<Signal<String>> = try_use_context::<Signal<String>>();
    let lang_marker = lang_code.as_ref().map(|s| s()).unwrap_or_default();

    rsx! {
        div { style: "display:none", "{lang_marker}" }
        section { class: "page page-topics",
            h1 { {crate::t!("page-topics-title")} }
            TopicsView {}
        }
    }
}
