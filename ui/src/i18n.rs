//! Localization for `statlab-ui`.
//!
//! Fluent bundles live under `i18n/<lang>/statlab-ui.ftl` and are embedded
//! with `rust-embed`. `en-US` is the fallback and is loaded as soon as the
//! loader is first touched, so `t!` resolves even in code that runs before
//! [`init`] (session logic, tests).
//!
//! ```ignore
//! use crate::t;
//! let label = t!("nav-topics");
//! let notice = t!("sweep-notice", value = "8".to_string());
//! ```
//!
//! Desktop builds pick the initial language from the OS locale list, web
//! builds from `navigator.languages`.
use std::sync::Once;

use i18n_embed::fluent::FluentLanguageLoader;
use i18n_embed::LanguageLoader;
use once_cell::sync::Lazy;
use rust_embed::Embed;
use tracing::{info, warn};
use unic_langid::LanguageIdentifier;

pub use i18n_embed_fl::fl;

/// `fl!` against the shared [`LOADER`].
#[macro_export]
macro_rules! t {
    ($key:literal) => {
        $crate::i18n::fl!(&*$crate::i18n::LOADER, $key)
    };
    ($key:literal, $( $arg:ident = $value:expr ),+ $(,)?) => {
        $crate::i18n::fl!(&*$crate::i18n::LOADER, $key, $( $arg = $value ),+ )
    };
}

/// Must match the FTL file name and `i18n.toml`.
const DOMAIN: &str = "statlab-ui";

#[derive(Embed)]
#[folder = "i18n"]
struct Localizations;

pub static LOADER: Lazy<FluentLanguageLoader> = Lazy::new(|| {
    let fallback: LanguageIdentifier = "en-US".parse().expect("valid fallback language identifier");
    let loader = FluentLanguageLoader::new(DOMAIN, fallback);
    // Messages end up in SVG text and exported JSON; no bidi marks there.
    loader.set_use_isolating(false);
    if let Err(err) = loader.load_fallback_language(&Localizations) {
        warn!(error = %err, "fallback bundle failed to load");
    }
    loader
});

static INIT: Once = Once::new();

/// Select the user's preferred language once per process.
pub fn init() {
    INIT.call_once(|| {
        let requested = requested_languages();
        match i18n_embed::select(&*LOADER, &Localizations, &requested) {
            Ok(selected) => info!(?selected, "languages selected"),
            Err(err) => warn!(error = %err, "language selection failed, using fallback"),
        }
    });
}

/// Switch to `tag`. Returns false, leaving the current bundle in place, when
/// the tag doesn't parse or isn't embedded.
pub fn set_language(tag: &str) -> bool {
    let Ok(lang) = tag.parse::<LanguageIdentifier>() else {
        warn!(tag, "ignoring malformed language tag");
        return false;
    };
    if !available_languages().iter().any(|code| code == tag) {
        warn!(tag, "no bundle for language");
        return false;
    }
    match i18n_embed::select(&*LOADER, &Localizations, &[lang]) {
        Ok(_) => true,
        Err(err) => {
            warn!(tag, error = %err, "language switch failed");
            false
        }
    }
}

/// The language messages currently resolve in.
pub fn current_language() -> String {
    LOADER.current_language().to_string()
}

/// Embedded language tags, sorted.
pub fn available_languages() -> Vec<String> {
    let mut langs: Vec<String> = LOADER
        .available_languages(&Localizations)
        .unwrap_or_default()
        .iter()
        .map(ToString::to_string)
        .collect();
    langs.sort();
    langs
}

#[cfg(target_arch = "wasm32")]
fn requested_languages() -> Vec<LanguageIdentifier> {
    i18n_embed::WebLanguageRequester::requested_languages()
}

#[cfg(not(target_arch = "wasm32"))]
fn requested_languages() -> Vec<LanguageIdentifier> {
    i18n_embed::DesktopLanguageRequester::requested_languages()
}
