use dioxus::prelude::*;

use crate::tasks::markov::MarkovView;

#[component]
pub fn Markov() -> Element {
    let lang_code: Option<Signal<String>> = try_use_context::<Signal<String>>();
    let lang_marker = lang_code.as_ref().map(|s| s()).unwrap_or_default();

    rsx! {
        div { style: "display:none", "{lang_marker}" }
        section { class: "page page-markov",
            h1 { {crate::t!("page-markov-title")} }
            MarkovView {}
        }
    }
}
