use api::{MarkovResult, TopicEntry};
use dioxus::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

#[cfg(target_arch = "wasm32")]
use crate::core::platform;
use crate::core::status::StatusLine;
use crate::results::{display_label, ResultStore};
use crate::t;

pub const TOPICS_EXPORT_FILE: &str = "topics_results.json";
pub const MARKOV_EXPORT_FILE: &str = "markov_results.json";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("There are no results to export yet.")]
    Empty,
    #[error("Unable to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Unable to save export: {0}")]
    Delivery(String),
}

impl ExportError {
    pub fn status(&self) -> StatusLine {
        match self {
            Self::Empty => StatusLine::warning(t!("export-empty")),
            Self::Serialize(err) => {
                StatusLine::error(t!("export-serialize-failed", detail = err.to_string()))
            }
            Self::Delivery(detail) => {
                StatusLine::error(t!("export-delivery-failed", detail = detail.clone()))
            }
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TopicRecord<'a> {
    id: u32,
    label: String,
    custom_label: Option<&'a str>,
    entries: &'a [TopicEntry],
}

/// Fold the labels currently shown on screen into the store, then serialize
/// it. The store keeps the applied edits afterwards.
pub fn export_topics<S: AsRef<str>>(
    store: &mut ResultStore,
    displayed_labels: &[S],
) -> Result<String, ExportError> {
    if store.is_empty() {
        return Err(ExportError::Empty);
    }
    let applied = store.apply_label_edits(displayed_labels);
    let records: Vec<TopicRecord<'_>> = store
        .items()
        .iter()
        .map(|item| TopicRecord {
            id: item.id,
            label: display_label(item),
            custom_label: item.custom_label.as_deref(),
            entries: &item.entries,
        })
        .collect();
    info!(items = records.len(), applied, "serialized topic export");
    Ok(serde_json::to_string_pretty(&records)?)
}

pub fn export_markov(result: Option<&MarkovResult>) -> Result<String, ExportError> {
    let result = result.ok_or(ExportError::Empty)?;
    Ok(serde_json::to_string_pretty(result)?)
}

/// Hand a serialized export to the platform. Returns the message to show.
pub async fn deliver_export(filename: &str, json: String) -> Result<String, ExportError> {
    let saved = download_bytes(filename, "application/json", json.into_bytes())
        .await
        .map_err(ExportError::Delivery)?;
    let file = filename.to_string();
    let message = match saved {
        Some(path) => t!("export-saved", file = file, path = path),
        None => t!("export-downloaded", file = file),
    };
    info!(filename, "export delivered");
    Ok(message)
}

/// Drive an export from a click handler: serialize up front, deliver in the
/// background on web and inline on desktop, and report into `status`.
pub fn run_export(
    filename: &'static str,
    serialized: Result<String, ExportError>,
    mut status: Signal<StatusLine>,
    mut busy: Signal<bool>,
) {
    let json = match serialized {
        Ok(json) => json,
        Err(err) => {
            warn!(filename, error = %err, "export refused");
            status.set(err.status());
            return;
        }
    };
    busy.set(true);
    status.set(StatusLine::working(t!("export-status-working")));

    #[cfg(target_arch = "wasm32")]
    {
        platform::spawn_future(async move {
            let outcome = deliver_export(filename, json).await;
            finish_export(outcome, status, busy);
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let outcome = futures::executor::block_on(deliver_export(filename, json));
        finish_export(outcome, status, busy);
    }
}

fn finish_export(
    outcome: Result<String, ExportError>,
    mut status: Signal<StatusLine>,
    mut busy: Signal<bool>,
) {
    match outcome {
        Ok(message) => status.set(StatusLine::done(message)),
        Err(err) => {
            warn!(error = %err, "export failed");
            status.set(err.status());
        }
    }
    busy.set(false);
}

async fn download_bytes(
    filename: &str,
    mime: &str,
    bytes: Vec<u8>,
) -> Result<Option<String>, String> {
    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::JsCast;
        use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

        let array = js_sys::Uint8Array::from(bytes.as_slice());
        let parts = js_sys::Array::new();
        parts.push(&array.buffer());

        let opts = BlobPropertyBag::new();
        opts.set_type(mime);
        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &opts)
            .map_err(|_| "Failed to create blob".to_string())?;
        let url = Url::create_object_url_with_blob(&blob)
            .map_err(|_| "Unable to create download".to_string())?;

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or("Document unavailable")?;
        let anchor: HtmlAnchorElement = document
            .create_element("a")
            .map_err(|_| "Unable to create anchor")?
            .dyn_into()
            .map_err(|_| "Anchor cast failed")?;
        anchor.set_href(&url);
        anchor.set_download(filename);
        anchor.style().set_property("display", "none").ok();

        document
            .body()
            .ok_or("Missing body")?
            .append_child(&anchor)
            .ok();
        anchor.click();
        anchor.remove();
        Url::revoke_object_url(&url).ok();

        Ok(None)
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = mime;
        let dir = desktop_export_dir()?;
        write_export(&dir, filename, &bytes).map(Some)
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn write_export(dir: &std::path::Path, filename: &str, bytes: &[u8]) -> Result<String, String> {
    std::fs::create_dir_all(dir).map_err(|err| err.to_string())?;
    let path = dir.join(filename);
    std::fs::write(&path, bytes).map_err(|err| err.to_string())?;
    Ok(path.to_string_lossy().to_string())
}

#[cfg(not(target_arch = "wasm32"))]
fn desktop_export_dir() -> Result<std::path::PathBuf, String> {
    let dirs = directories::ProjectDirs::from("com", "Statlab", "Statlab")
        .ok_or("Unable to determine export directory")?;
    Ok(dirs.data_dir().join("exports"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::{TopicItem, Transition, TransitionEntry};
    use serde_json::Value;

    fn store_with(ids: &[u32]) -> ResultStore {
        let mut store = ResultStore::default();
        store.replace(
            ids.iter()
                .map(|&id| TopicItem {
                    id,
                    entries: vec![TopicEntry {
                        label: format!("word{id}"),
                        weight: 0.25,
                    }],
                    custom_label: None,
                })
                .collect(),
        );
        store
    }

    #[test]
    fn empty_store_is_refused() {
        let mut store = ResultStore::default();
        let err = export_topics::<&str>(&mut store, &[]).unwrap_err();
        assert!(matches!(err, ExportError::Empty));
        assert_eq!(
            err.status(),
            StatusLine::warning("There are no results to export yet.")
        );
    }

    #[test]
    fn delivery_failures_keep_their_detail() {
        let status = ExportError::Delivery("disk full".into()).status();
        assert_eq!(status, StatusLine::error("Unable to save export: disk full"));
    }

    #[test]
    fn edited_label_lands_in_export_and_store() {
        let mut store = store_with(&[0, 1]);
        let before = store.snapshot();

        let json = export_topics(&mut store, &["Custom", "Item 1"]).unwrap();
        let records: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(records[0]["customLabel"], "Custom");
        assert_eq!(records[0]["label"], "Custom");
        assert_eq!(records[0]["id"], 0);
        assert_eq!(records[0]["entries"][0]["label"], "word0");
        assert_eq!(records[1]["id"], 1);

        let after = store.snapshot();
        assert_eq!(after[0].custom_label.as_deref(), Some("Custom"));
        assert_eq!(after[0].entries, before[0].entries);
        assert_eq!(after[1].entries, before[1].entries);
    }

    #[test]
    fn blank_edits_export_default_labels() {
        let mut store = store_with(&[5]);
        let json = export_topics(&mut store, &["  "]).unwrap();
        let records: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(records[0]["label"], "Item 5");
        assert_eq!(records[0]["customLabel"], Value::Null);
    }

    #[test]
    fn markov_export_needs_a_result() {
        assert!(matches!(export_markov(None), Err(ExportError::Empty)));

        let result = MarkovResult {
            generated_text: "el perro".into(),
            transition_matrix: vec![TransitionEntry {
                source_token: "el".into(),
                transitions: vec![Transition {
                    token: "perro".into(),
                    probability: 1.0,
                }],
            }],
        };
        let json = export_markov(Some(&result)).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["generatedText"], "el perro");
        assert_eq!(value["transitionMatrix"][0]["sourceToken"], "el");
    }

    #[test]
    fn desktop_writes_into_export_dir() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("exports");
        let path = write_export(&target, TOPICS_EXPORT_FILE, b"[]").unwrap();
        assert!(path.ends_with(TOPICS_EXPORT_FILE));
        assert_eq!(std::fs::read(target.join(TOPICS_EXPORT_FILE)).unwrap(), b"[]");
    }
}
