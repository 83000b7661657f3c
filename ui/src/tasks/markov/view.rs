use std::cell::RefCell;
use std::rc::Rc;

use api::{ApiError, MarkovResult, NumericClient};
use dioxus::prelude::*;
use futures_channel::mpsc::UnboundedSender;
use futures_util::StreamExt;

use super::session::{MarkovForm, MarkovSession};
use crate::components::StatusBanner;
use crate::core::config::AppConfig;
use crate::core::fence::Ticket;
use crate::core::platform;
use crate::core::status::StatusLine;
use crate::results::{run_export, RankedCard, SvgCharts, MARKOV_EXPORT_FILE};
use crate::t;

#[component]
pub fn MarkovView() -> Element {
    let config = try_use_context::<AppConfig>().unwrap_or_else(AppConfig::load);
    let client = use_hook(|| NumericClient::new(config.api_base_url.clone()));

    let mut session = use_signal(|| MarkovSession::new(SvgCharts::default(), &config));
    let mut form = use_signal(MarkovForm::default);
    let status = use_signal(StatusLine::default);
    let generating = use_signal(|| false);
    let export_status = use_signal(StatusLine::default);
    let exporting = use_signal(|| false);
    let mut visible_input = use_signal(|| config.default_visible_entries.to_string());

    let sender_slot: Rc<RefCell<Option<UnboundedSender<MarkovEvent>>>> =
        Rc::new(RefCell::new(None));
    let sender_slot_for_loop = sender_slot.clone();

    let coroutine = use_coroutine(move |mut rx: UnboundedReceiver<MarkovEvent>| {
        let sender_slot = sender_slot_for_loop.clone();
        let client = client.clone();
        let mut status = status;
        let mut generating = generating;

        async move {
            while let Some(event) = rx.next().await {
                match event {
                    MarkovEvent::Generate => {
                        let begun = session.with_mut(|s| s.begin(&form.peek()));
                        match begun {
                            Ok((ticket, request)) => {
                                generating.set(true);
                                status.set(StatusLine::working(t!("markov-status-working")));
                                let Some(sender) = sender_slot.borrow().as_ref().cloned() else {
                                    continue;
                                };
                                let client = client.clone();
                                platform::spawn_future(async move {
                                    let outcome = client.generate_markov(&request).await;
                                    let _ = sender
                                        .unbounded_send(MarkovEvent::Generated { ticket, outcome });
                                });
                            }
                            Err(err) => status.set(StatusLine::error(err.message())),
                        }
                    }
                    MarkovEvent::Generated { ticket, outcome } => {
                        if let Some(line) = session.with_mut(|s| s.finish(ticket, outcome)) {
                            status.set(line);
                            generating.set(false);
                        }
                    }
                }
            }
        }
    });

    sender_slot.borrow_mut().replace(coroutine.tx());

    let form_now = form();
    let snapshot = session.read();
    let generated = snapshot.generated_text().map(str::to_string);
    let cards = snapshot.cards();
    drop(snapshot);

    rsx! {
        article { class: "task task-markov",
            div { class: "task__header",
                h2 { {t!("markov-title")} }
                p { {t!("markov-intro")} }
            }

            form {
                class: "task-form",
                onsubmit: move |evt: FormEvent| {
                    evt.prevent_default();
                    coroutine.send(MarkovEvent::Generate);
                },
                label { class: "task-form__field task-form__field--wide",
                    span { {t!("markov-source-label")} }
                    textarea {
                        rows: "8",
                        value: "{form_now.source_text}",
                        oninput: move |evt| form.with_mut(|f| f.source_text = evt.value()),
                    }
                }
                label { class: "task-form__field",
                    span { {t!("markov-words-label")} }
                    input {
                        r#type: "number",
                        min: "1",
                        value: "{form_now.word_count}",
                        oninput: move |evt| form.with_mut(|f| f.word_count = evt.value()),
                    }
                }
                div { class: "task-form__actions",
                    button {
                        r#type: "submit",
                        class: "button button--primary",
                        disabled: generating(),
                        if generating() { {t!("markov-generating")} } else { {t!("markov-generate")} }
                    }
                }
            }
            StatusBanner { status: status() }

            if let Some(text) = generated {
                section { class: "task-panel results-panel",
                    h3 { {t!("markov-output-title")} }
                    blockquote { class: "task-markov__output", "{text}" }

                    div { class: "results-panel__controls",
                        label { class: "task-form__field",
                            span { {t!("results-visible-label")} }
                            input {
                                r#type: "number",
                                min: "1",
                                value: "{visible_input}",
                                oninput: move |evt| {
                                    let raw = evt.value();
                                    session.with_mut(|s| s.set_visible(&raw));
                                    visible_input.set(raw);
                                },
                                onchange: move |_| {
                                    let visible = session.peek().visible();
                                    if visible.corrected {
                                        visible_input.set(visible.value.to_string());
                                    }
                                },
                            }
                        }
                        button {
                            r#type: "button",
                            class: "button button--primary",
                            disabled: exporting(),
                            onclick: move |_| {
                                if exporting() {
                                    return;
                                }
                                let serialized = session.peek().export();
                                run_export(MARKOV_EXPORT_FILE, serialized, export_status, exporting);
                            },
                            {t!("results-export")}
                        }
                    }
                    StatusBanner { status: export_status() }

                    h3 { {t!("markov-matrix-title")} }
                    div { class: "results-grid",
                        for (position, card) in cards.into_iter().enumerate() {
                            RankedCard {
                                key: "{position}",
                                model: card,
                                on_toggle: move |key: u32| session.with_mut(|s| s.toggle_view(key)),
                            }
                        }
                    }
                }
            }
        }
    }
}

#[derive(Debug)]
enum MarkovEvent {
    Generate,
    Generated {
        ticket: Ticket,
        outcome: Result<MarkovResult, ApiError>,
    },
}
