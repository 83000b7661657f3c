use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use api::{ApiError, NumericClient, SplitStrategy, SweepPoint, TopicAnalysis, Upload};
use dioxus::prelude::*;
use futures_channel::mpsc::UnboundedSender;
use futures_util::StreamExt;
use tracing::info;

use super::params::AnalysisForm;
use super::session::{SweepOutcome, TopicsSession};
use super::sweep::{SweepForm, SweepMode};
use crate::components::StatusBanner;
use crate::core::config::AppConfig;
use crate::core::fence::Ticket;
use crate::core::format::format_seconds;
use crate::core::status::StatusLine;
use crate::core::{platform, timing};
use crate::results::{
    run_export, LineChartView, RankedCard, SvgCharts, SweepChartView, TOPICS_EXPORT_FILE,
};
use crate::t;

type SenderSlot = Rc<RefCell<Option<UnboundedSender<TopicsEvent>>>>;

#[component]
pub fn TopicsView() -> Element {
    let config = try_use_context::<AppConfig>().unwrap_or_else(AppConfig::load);
    let client = use_hook(|| NumericClient::new(config.api_base_url.clone()));

    let mut session = use_signal(|| TopicsSession::new(SvgCharts::default(), &config));
    let mut form = use_signal(AnalysisForm::default);
    let mut sweep_form = use_signal(SweepForm::default);
    let mut upload = use_signal(|| Option::<Upload>::None);
    let status = use_signal(StatusLine::default);
    let sweep_status = use_signal(StatusLine::default);
    let notice = use_signal(|| Option::<String>::None);
    let analyzing = use_signal(|| false);
    let sweeping = use_signal(|| false);
    let export_status = use_signal(StatusLine::default);
    let exporting = use_signal(|| false);
    let mut visible_input = use_signal(|| config.default_visible_entries.to_string());

    let sender_slot: SenderSlot = Rc::new(RefCell::new(None));
    let sender_slot_for_loop = sender_slot.clone();
    let settle_ms = config.sweep_settle_ms;
    let notice_ms = config.sweep_notice_ms;

    let coroutine = use_coroutine(move |mut rx: UnboundedReceiver<TopicsEvent>| {
        let sender_slot = sender_slot_for_loop.clone();
        let client = client.clone();
        let mut status = status;
        let mut sweep_status = sweep_status;
        let mut notice = notice;
        let mut analyzing = analyzing;
        let mut sweeping = sweeping;

        async move {
            let mut notice_serial = 0_u64;

            while let Some(event) = rx.next().await {
                match event {
                    TopicsEvent::Analyze => {
                        let file = upload.peek().clone();
                        let begun = session
                            .with_mut(|s| s.begin_analysis(&form.peek(), file.as_ref()));
                        match (begun, file) {
                            (Ok((ticket, params)), Some(file)) => {
                                analyzing.set(true);
                                status.set(StatusLine::working(t!("topics-status-starting")));
                                let client = client.clone();
                                dispatch(&sender_slot, async move {
                                    let outcome = client.analyze_topics(&file, &params).await;
                                    TopicsEvent::AnalysisDone { ticket, outcome }
                                });
                            }
                            (Err(err), _) => status.set(StatusLine::error(err.message())),
                            (Ok(_), None) => {}
                        }
                    }
                    TopicsEvent::AnalysisDone { ticket, outcome } => {
                        let applied = session.with_mut(|s| s.finish_analysis(ticket, outcome));
                        if let Some(line) = applied {
                            status.set(line);
                            analyzing.set(false);
                            let visible = session.peek().visible();
                            if visible.corrected {
                                visible_input.set(visible.value.to_string());
                            }
                        }
                    }
                    TopicsEvent::Sweep => {
                        let file = upload.peek().clone();
                        let mut request = sweep_form.peek().clone();
                        request.split = form.peek().split;
                        let begun = session.with_mut(|s| s.begin_sweep(&request, file.as_ref()));
                        match (begun, file) {
                            (Ok((ticket, params)), Some(file)) => {
                                sweeping.set(true);
                                sweep_status.set(StatusLine::working(t!("sweep-status-working")));
                                let client = client.clone();
                                dispatch(&sender_slot, async move {
                                    let outcome = client.sweep_topics(&file, &params).await;
                                    TopicsEvent::SweepDone { ticket, outcome }
                                });
                            }
                            (Err(err), _) => sweep_status.set(StatusLine::error(err.message())),
                            (Ok(_), None) => {}
                        }
                    }
                    TopicsEvent::SweepDone { ticket, outcome } => {
                        match session.with_mut(|s| s.finish_sweep(ticket, outcome)) {
                            SweepOutcome::Stale => {}
                            SweepOutcome::Selected(best) => {
                                sweeping.set(false);
                                form.with_mut(|f| f.adopt_topic_count(best));
                                sweep_status.set(StatusLine::done(t!(
                                    "sweep-status-done",
                                    delay = format_seconds(settle_ms)
                                )));
                                notice_serial += 1;
                                notice.set(Some(t!("sweep-notice", value = best.to_string())));
                                info!(best, settle_ms, "re-running analysis with sweep winner");

                                dispatch(&sender_slot, async move {
                                    timing::sleep_ms(settle_ms).await;
                                    TopicsEvent::Analyze
                                });
                                let serial = notice_serial;
                                dispatch(&sender_slot, async move {
                                    timing::sleep_ms(notice_ms).await;
                                    TopicsEvent::NoticeExpired { serial }
                                });
                            }
                            SweepOutcome::NoCandidate => {
                                sweeping.set(false);
                                sweep_status.set(StatusLine::warning(t!("sweep-status-empty")));
                            }
                            SweepOutcome::Failed(line) => {
                                sweeping.set(false);
                                sweep_status.set(line);
                            }
                        }
                    }
                    TopicsEvent::NoticeExpired { serial } => {
                        if serial == notice_serial {
                            notice.set(None);
                        }
                    }
                }
            }
        }
    });

    sender_slot.borrow_mut().replace(coroutine.tx());

    let form_now = form();
    let sweep_now = sweep_form();
    let snapshot = session.read();
    let cards = snapshot.cards();
    let entropy = snapshot.entropy_points(config.trace_max_points);
    let sweep_points: Vec<SweepPoint> = snapshot.sweep_points().to_vec();
    let selected = snapshot.selected();
    let has_results = snapshot.has_results();
    drop(snapshot);

    let file_name = upload
        .read()
        .as_ref()
        .map(|file| file.file_name.clone());
    let bound_label = match sweep_now.mode {
        SweepMode::End => t!("sweep-bound-end-label"),
        SweepMode::Threshold => t!("sweep-bound-threshold-label"),
    };

    rsx! {
        article { class: "task task-topics",
            div { class: "task__header",
                h2 { {t!("topics-title")} }
                p { {t!("topics-intro")} }
            }

            form {
                class: "task-form",
                onsubmit: move |evt: FormEvent| {
                    evt.prevent_default();
                    coroutine.send(TopicsEvent::Analyze);
                },
                label { class: "task-form__field task-form__field--wide",
                    span { {t!("topics-file-label")} }
                    input {
                        r#type: "file",
                        accept: ".pdf",
                        onchange: move |evt: FormEvent| async move {
                            let Some(engine) = evt.files() else {
                                return;
                            };
                            let Some(name) = engine.files().first().cloned() else {
                                upload.set(None);
                                return;
                            };
                            let bytes = engine.read_file(&name).await;
                            upload.set(bytes.map(|bytes| Upload::new(name, bytes)));
                        },
                    }
                    if let Some(name) = file_name {
                        small { class: "task-form__hint", "{name}" }
                    }
                }
                label { class: "task-form__field",
                    span { {t!("topics-k-label")} }
                    input {
                        r#type: "number",
                        min: "1",
                        value: "{form_now.k}",
                        oninput: move |evt| form.with_mut(|f| f.k = evt.value()),
                    }
                }
                label { class: "task-form__field",
                    span { {t!("topics-iterations-label")} }
                    input {
                        r#type: "number",
                        min: "1",
                        value: "{form_now.iterations}",
                        oninput: move |evt| form.with_mut(|f| f.iterations = evt.value()),
                    }
                }
                label { class: "task-form__field",
                    span { {t!("topics-alpha-label")} }
                    input {
                        r#type: "text",
                        inputmode: "decimal",
                        placeholder: "auto",
                        value: "{form_now.alpha}",
                        oninput: move |evt| form.with_mut(|f| f.alpha = evt.value()),
                    }
                }
                label { class: "task-form__field",
                    span { {t!("topics-beta-label")} }
                    input {
                        r#type: "text",
                        inputmode: "decimal",
                        placeholder: "auto",
                        value: "{form_now.beta}",
                        oninput: move |evt| form.with_mut(|f| f.beta = evt.value()),
                    }
                }
                label { class: "task-form__field",
                    span { {t!("topics-threshold-label")} }
                    input {
                        r#type: "text",
                        inputmode: "decimal",
                        value: "{form_now.threshold}",
                        oninput: move |evt| form.with_mut(|f| f.threshold = evt.value()),
                    }
                }
                label { class: "task-form__field",
                    span { {t!("topics-patience-label")} }
                    input {
                        r#type: "number",
                        min: "1",
                        value: "{form_now.patience}",
                        oninput: move |evt| form.with_mut(|f| f.patience = evt.value()),
                    }
                }
                label { class: "task-form__field",
                    span { {t!("topics-split-label")} }
                    select {
                        onchange: move |evt| {
                            if let Some(split) = SplitStrategy::parse(&evt.value()) {
                                form.with_mut(|f| f.split = split);
                            }
                        },
                        for split in SplitStrategy::ALL {
                            option {
                                value: split.as_str(),
                                selected: form_now.split == split,
                                {split_label(split)}
                            }
                        }
                    }
                }
                div { class: "task-form__actions",
                    button {
                        r#type: "submit",
                        class: "button button--primary",
                        disabled: analyzing(),
                        if analyzing() { {t!("topics-analyzing")} } else { {t!("topics-analyze")} }
                    }
                }
            }
            StatusBanner { status: status() }

            section { class: "task-panel task-sweep",
                h3 { {t!("sweep-title")} }
                p { {t!("sweep-intro")} }
                div { class: "task-form",
                    label { class: "task-form__field",
                        span { {t!("sweep-start-label")} }
                        input {
                            r#type: "number",
                            min: "1",
                            value: "{sweep_now.start}",
                            oninput: move |evt| sweep_form.with_mut(|f| f.start = evt.value()),
                        }
                    }
                    label { class: "task-form__field",
                        span { {t!("sweep-mode-label")} }
                        select {
                            onchange: move |evt| {
                                if let Some(mode) = SweepMode::parse(&evt.value()) {
                                    sweep_form.with_mut(|f| f.mode = mode);
                                }
                            },
                            for mode in SweepMode::ALL {
                                option {
                                    value: mode.as_str(),
                                    selected: sweep_now.mode == mode,
                                    {mode_label(mode)}
                                }
                            }
                        }
                    }
                    label { class: "task-form__field",
                        span { "{bound_label}" }
                        input {
                            r#type: "text",
                            inputmode: "decimal",
                            value: "{sweep_now.bound}",
                            oninput: move |evt| sweep_form.with_mut(|f| f.bound = evt.value()),
                        }
                    }
                    label { class: "task-form__field",
                        span { {t!("sweep-step-label")} }
                        input {
                            r#type: "number",
                            min: "1",
                            value: "{sweep_now.step}",
                            oninput: move |evt| sweep_form.with_mut(|f| f.step = evt.value()),
                        }
                    }
                    label { class: "task-form__field",
                        span { {t!("sweep-repetitions-label")} }
                        input {
                            r#type: "number",
                            min: "1",
                            value: "{sweep_now.repetitions}",
                            oninput: move |evt| sweep_form.with_mut(|f| f.repetitions = evt.value()),
                        }
                    }
                    div { class: "task-form__actions",
                        button {
                            r#type: "button",
                            class: "button",
                            disabled: sweeping(),
                            onclick: move |_| coroutine.send(TopicsEvent::Sweep),
                            if sweeping() { {t!("sweep-running")} } else { {t!("sweep-run")} }
                        }
                    }
                }
                StatusBanner { status: sweep_status() }
                if let Some(message) = notice() {
                    p { class: "task-sweep__notice", role: "status", "{message}" }
                }
                if !sweep_points.is_empty() {
                    SweepChartView { points: sweep_points, best: selected }
                }
            }

            if has_results {
                section { class: "task-panel results-panel",
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
                                let serialized = session.with_mut(|s| s.export());
                                run_export(TOPICS_EXPORT_FILE, serialized, export_status, exporting);
                            },
                            {t!("results-export")}
                        }
                    }
                    StatusBanner { status: export_status() }

                    if let Some(points) = entropy {
                        LineChartView {
                            title: t!("results-entropy-title"),
                            points,
                            y_label: "score".to_string(),
                        }
                    }

                    div { class: "results-grid",
                        for (position, card) in cards.into_iter().enumerate() {
                            RankedCard {
                                key: "{position}",
                                model: card,
                                on_toggle: move |id: u32| session.with_mut(|s| s.toggle_view(id)),
                                on_label_input: move |text: String| {
                                    session.with_mut(|s| s.edit_label(position, text))
                                },
                            }
                        }
                    }
                }
            }
        }
    }
}

fn split_label(split: SplitStrategy) -> String {
    match split {
        SplitStrategy::Chapters => t!("split-chapters"),
        SplitStrategy::Pages => t!("split-pages"),
    }
}

fn mode_label(mode: SweepMode) -> String {
    match mode {
        SweepMode::End => t!("sweep-mode-end"),
        SweepMode::Threshold => t!("sweep-mode-threshold"),
    }
}

/// Run `task` off the event loop and feed its result back in.
fn dispatch<F>(sender_slot: &SenderSlot, task: F)
where
    F: Future<Output = TopicsEvent> + 'static,
{
    if let Some(sender) = sender_slot.borrow().as_ref().cloned() {
        platform::spawn_future(async move {
            let _ = sender.unbounded_send(task.await);
        });
    }
}

#[derive(Debug)]
enum TopicsEvent {
    Analyze,
    AnalysisDone {
        ticket: Ticket,
        outcome: Result<TopicAnalysis, ApiError>,
    },
    Sweep,
    SweepDone {
        ticket: Ticket,
        outcome: Result<Vec<SweepPoint>, ApiError>,
    },
    NoticeExpired {
        serial: u64,
    },
}
