//! Shared UI crate for Statlab: result state, rendering and the three tool
//! views. Launchers in `web` and `desktop` only add routing.

pub mod core;
pub mod i18n;
pub mod results;
pub mod tasks;
pub mod views;

pub mod components {
    // Localized application navbar (components/app_navbar.rs)
    pub mod app_navbar;
    pub use app_navbar::register_nav;
    pub use app_navbar::AppNavbar;
    pub use app_navbar::NavBuilder;

    mod status_banner;
    pub use status_banner::StatusBanner;
}

pub use crate::core::config::AppConfig;

#[cfg(test)]
mod tests {
    mod i18n_completeness;
}
