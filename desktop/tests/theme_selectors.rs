#![cfg(test)]
//! Selectors the shared components rely on must stay in the unified theme.
//! When a component renames a class, update `REQUIRED_SELECTORS` with it.

const THEME_CSS: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../ui/assets/theme/main.css"
));

const REQUIRED_SELECTORS: &[&str] = &[
    // Global / layout
    ":root",
    "body {",
    ".page {",
    ".visually-hidden",
    // Buttons
    ".button {",
    ".button--primary",
    ".button--ghost",
    // Forms
    ".task-form",
    ".task-form__field",
    ".task-form__actions",
    ".task-sweep__notice",
    ".task-markov__output",
    // Status line
    ".status-line",
    ".status-line--success",
    ".status-line--warning",
    ".status-line--error",
    // Result cards
    ".results-panel__controls",
    ".results-grid",
    ".results-card",
    ".results-card__header",
    ".ranked-card__label",
    ".ranked-card__table",
    // Charts
    ".results-chart",
    ".results-chart__title",
    ".results-chart__legend-swatch--warmup",
    ".results-chart__legend-swatch--stationary",
    ".chart__series--warmup",
    ".chart__series--stationary",
    ".chart__error",
    ".chart__marker--best",
    ".chart__cell",
    // Responsive block
    "@media (max-width: 720px)",
];

#[test]
fn unified_theme_contains_required_selectors() {
    let missing: Vec<_> = REQUIRED_SELECTORS
        .iter()
        .filter(|sel| !THEME_CSS.contains(**sel))
        .copied()
        .collect();

    assert!(
        missing.is_empty(),
        "missing {} required CSS selectors in unified theme:\n{}",
        missing.len(),
        missing.join("\n")
    );
}

#[test]
fn unified_theme_not_trivially_empty() {
    let non_ws_len = THEME_CSS.chars().filter(|c| !c.is_whitespace()).count();
    assert!(
        non_ws_len > 4_000,
        "embedded theme is unexpectedly small ({non_ws_len} non-whitespace chars)"
    );
}

#[test]
fn trace_legend_matches_trace_series() {
    for phase in ["warmup", "stationary"] {
        assert!(THEME_CSS.contains(&format!(".chart__series--{phase}")));
        assert!(THEME_CSS.contains(&format!(".results-chart__legend-swatch--{phase}")));
    }
}
