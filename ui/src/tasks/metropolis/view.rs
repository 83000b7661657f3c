use std::cell::RefCell;
use std::rc::Rc;

use api::{ApiError, MetropolisResult, NumericClient};
use dioxus::prelude::*;
use futures_channel::mpsc::UnboundedSender;
use futures_util::StreamExt;

use super::params::{DistributionKind, MetropolisForm, ParamField};
use super::session::MetropolisSession;
use crate::components::StatusBanner;
use crate::core::config::AppConfig;
use crate::core::fence::Ticket;
use crate::core::platform;
use crate::core::status::StatusLine;
use crate::results::{HeatmapView, HistogramView, TraceChartView};
use crate::t;

#[component]
pub fn MetropolisView() -> Element {
    let config = try_use_context::<AppConfig>().unwrap_or_else(AppConfig::load);
    let client = use_hook(|| NumericClient::new(config.api_base_url.clone()));

    let mut session = use_signal(|| MetropolisSession::new(&config));
    let mut form = use_signal(MetropolisForm::default);
    let status = use_signal(StatusLine::default);
    let sampling = use_signal(|| false);

    let sender_slot: Rc<RefCell<Option<UnboundedSender<SamplerEvent>>>> =
        Rc::new(RefCell::new(None));
    let sender_slot_for_loop = sender_slot.clone();

    let coroutine = use_coroutine(move |mut rx: UnboundedReceiver<SamplerEvent>| {
        let sender_slot = sender_slot_for_loop.clone();
        let client = client.clone();
        let mut status = status;
        let mut sampling = sampling;

        async move {
            while let Some(event) = rx.next().await {
                match event {
                    SamplerEvent::Run => match session.with_mut(|s| s.begin(&form.peek())) {
                        Ok((ticket, request)) => {
                            sampling.set(true);
                            status.set(StatusLine::working(t!("metropolis-status-working")));
                            let Some(sender) = sender_slot.borrow().as_ref().cloned() else {
                                continue;
                            };
                            let client = client.clone();
                            platform::spawn_future(async move {
                                let outcome = client.run_metropolis(&request).await;
                                let _ =
                                    sender.unbounded_send(SamplerEvent::Sampled { ticket, outcome });
                            });
                        }
                        Err(err) => status.set(StatusLine::error(err.message())),
                    },
                    SamplerEvent::Sampled { ticket, outcome } => {
                        if let Some(line) = session.with_mut(|s| s.finish(ticket, outcome)) {
                            status.set(line);
                            sampling.set(false);
                        }
                    }
                }
            }
        }
    });

    sender_slot.borrow_mut().replace(coroutine.tx());

    let form_now = form();
    let fields: Vec<(ParamField, &'static str, String)> = form_now
        .kind
        .fields()
        .iter()
        .map(|&field| (field, field.symbol(), form_now.param(field).to_string()))
        .collect();

    let snapshot = session.read();
    let acceptance = snapshot.acceptance();
    let trace_points = snapshot.trace_points();
    let histogram = snapshot
        .result()
        .map(|r| (r.histogram_x.clone(), r.histogram_y.clone()));
    let surface = snapshot
        .result()
        .filter(|_| snapshot.has_surface())
        .map(|r| (r.surface_x.clone(), r.surface_y.clone(), r.surface_z.clone()));
    drop(snapshot);

    rsx! {
        article { class: "task task-metropolis",
            div { class: "task__header",
                h2 { {t!("metropolis-title")} }
                p { {t!("metropolis-intro")} }
            }

            form {
                class: "task-form",
                onsubmit: move |evt: FormEvent| {
                    evt.prevent_default();
                    coroutine.send(SamplerEvent::Run);
                },
                label { class: "task-form__field",
                    span { {t!("metropolis-distribution-label")} }
                    select {
                        onchange: move |evt| {
                            if let Some(kind) = DistributionKind::parse(&evt.value()) {
                                form.with_mut(|f| f.kind = kind);
                            }
                        },
                        for kind in DistributionKind::ALL {
                            option {
                                value: kind.as_str(),
                                selected: form_now.kind == kind,
                                {distribution_label(kind)}
                            }
                        }
                    }
                }
                label { class: "task-form__field",
                    span { {t!("metropolis-iterations-label")} }
                    input {
                        r#type: "number",
                        min: "1",
                        value: "{form_now.iterations}",
                        oninput: move |evt| form.with_mut(|f| f.iterations = evt.value()),
                    }
                }
                label { class: "task-form__field",
                    span { {t!("metropolis-sigma-label")} }
                    input {
                        r#type: "text",
                        inputmode: "decimal",
                        value: "{form_now.sigma}",
                        oninput: move |evt| form.with_mut(|f| f.sigma = evt.value()),
                    }
                }
                label { class: "task-form__field",
                    span { {t!("metropolis-start-x-label")} }
                    input {
                        r#type: "text",
                        inputmode: "decimal",
                        value: "{form_now.start_x}",
                        oninput: move |evt| form.with_mut(|f| f.start_x = evt.value()),
                    }
                }
                label { class: "task-form__field",
                    span { {t!("metropolis-start-y-label")} }
                    input {
                        r#type: "text",
                        inputmode: "decimal",
                        value: "{form_now.start_y}",
                        oninput: move |evt| form.with_mut(|f| f.start_y = evt.value()),
                    }
                }
                for (field, symbol, value) in fields {
                    label { key: "{symbol}", class: "task-form__field",
                        span { "{symbol}" }
                        input {
                            r#type: "text",
                            inputmode: "decimal",
                            value: "{value}",
                            oninput: move |evt| form.with_mut(|f| f.set_param(field, evt.value())),
                        }
                    }
                }
                div { class: "task-form__actions",
                    button {
                        r#type: "submit",
                        class: "button button--primary",
                        disabled: sampling(),
                        if sampling() { {t!("metropolis-running")} } else { {t!("metropolis-run")} }
                    }
                }
            }
            StatusBanner { status: status() }

            if let Some(rate) = acceptance {
                section { class: "task-panel results-panel",
                    p { class: "task-metropolis__rate",
                        {t!("metropolis-acceptance-label")}
                        " "
                        strong { "{rate}" }
                    }
                    if !trace_points.is_empty() {
                        TraceChartView { points: trace_points }
                    }
                    if let Some((centers, densities)) = histogram {
                        HistogramView { centers, densities }
                    }
                    if let Some((xs, ys, z)) = surface {
                        HeatmapView { xs, ys, z }
                    }
                }
            }
        }
    }
}

fn distribution_label(kind: DistributionKind) -> String {
    match kind {
        DistributionKind::Bimodal => t!("distribution-bimodal"),
        DistributionKind::Bivariate => t!("distribution-bivariate"),
        DistributionKind::Poisson => t!("distribution-poisson"),
        DistributionKind::Binomial => t!("distribution-binomial"),
        DistributionKind::Beta => t!("distribution-beta"),
        DistributionKind::Student => t!("distribution-student"),
        DistributionKind::Chi2 => t!("distribution-chi2"),
        DistributionKind::Fisher => t!("distribution-fisher"),
    }
}

#[derive(Debug)]
enum SamplerEvent {
    Run,
    Sampled {
        ticket: Ticket,
        outcome: Result<MetropolisResult, ApiError>,
    },
}
