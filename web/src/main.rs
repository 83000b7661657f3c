use dioxus::logger::tracing::Level;
use dioxus::prelude::*;

use ui::components::app_navbar::{register_nav, NavBuilder};
use ui::components::AppNavbar;
use ui::views::{Home, Markov, Metropolis, Topics};
use ui::AppConfig;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(WebNavbar)]
    #[route("/")]
    Home {},
    #[route("/topics")]
    Topics {},
    #[route("/markov")]
    Markov {},
    #[route("/metropolis")]
    Metropolis {},
}

const MAIN_CSS_INLINE: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../ui/assets/theme/main.css"
));

fn nav_home(label: &str) -> Element {
    rsx!(Link {
        class: "navbar__link",
        to: Route::Home {},
        "{label}"
    })
}
fn nav_topics(label: &str) -> Element {
    rsx!(Link {
        class: "navbar__link",
        to: Route::Topics {},
        "{label}"
    })
}
fn nav_markov(label: &str) -> Element {
    rsx!(Link {
        class: "navbar__link",
        to: Route::Markov {},
        "{label}"
    })
}
fn nav_metropolis(label: &str) -> Element {
    rsx!(Link {
        class: "navbar__link",
        to: Route::Metropolis {},
        "{label}"
    })
}

fn main() {
    dioxus::logger::init(Level::INFO).ok();
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    ui::i18n::init();
    use_context_provider(AppConfig::load);

    let lang_code = use_signal(ui::i18n::current_language);
    use_context_provider(|| lang_code);

    register_nav(NavBuilder {
        home: nav_home,
        topics: nav_topics,
        markov: nav_markov,
        metropolis: nav_metropolis,
    });

    rsx! {
        document::Style { "{MAIN_CSS_INLINE}" }

        div {
            key: "{lang_code()}",
            Router::<Route> {}
        }
    }
}

/// Web layout: the shared navbar above the routed page.
#[component]
fn WebNavbar() -> Element {
    rsx! {
        AppNavbar { }
        Outlet::<Route> {}
    }
}
