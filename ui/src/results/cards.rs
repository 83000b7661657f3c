use dioxus::prelude::*;

use super::charts::BarChartView;
use super::view::{Presentation, ViewMode};
use crate::t;

/// Everything a card needs to draw one ranked item.
#[derive(Clone, Debug, PartialEq)]
pub struct RankedCardModel {
    pub key: u32,
    pub heading: String,
    /// Topic cards carry an editable label; transition cards don't.
    pub editable: bool,
    pub mode: ViewMode,
    pub presentation: Presentation,
}

#[component]
pub fn RankedCard(
    model: RankedCardModel,
    on_toggle: EventHandler<u32>,
    on_label_input: Option<EventHandler<String>>,
) -> Element {
    let key = model.key;
    let toggle_label = match model.mode {
        ViewMode::Tabular => t!("results-show-chart"),
        ViewMode::Graphical => t!("results-show-table"),
    };

    rsx! {
        article { class: "results-card ranked-card",
            div { class: "results-card__header",
                if model.editable {
                    input {
                        class: "ranked-card__label",
                        r#type: "text",
                        value: "{model.heading}",
                        aria_label: t!("results-label-aria"),
                        oninput: move |evt: FormEvent| {
                            if let Some(handler) = on_label_input {
                                handler.call(evt.value());
                            }
                        },
                    }
                } else {
                    h3 { class: "ranked-card__heading", "{model.heading}" }
                }
                button {
                    r#type: "button",
                    class: "button button--ghost ranked-card__toggle",
                    onclick: move |_| on_toggle.call(key),
                    "{toggle_label}"
                }
            }
            match model.presentation {
                Presentation::Tabular(rows) => rsx! {
                    table { class: "ranked-card__table",
                        thead {
                            tr {
                                th { {t!("results-col-entry")} }
                                th { {t!("results-col-weight")} }
                            }
                        }
                        tbody {
                            for (i, row) in rows.into_iter().enumerate() {
                                tr { key: "{i}",
                                    td { "{row.label}" }
                                    td { class: "ranked-card__weight", "{row.percent}" }
                                }
                            }
                        }
                    }
                },
                Presentation::Graphical(chart) => rsx! {
                    BarChartView { chart }
                },
            }
        }
    }
}
