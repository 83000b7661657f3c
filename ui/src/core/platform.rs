//! Platform glue: task spawning and page introspection.

use std::future::Future;

/// Run a future on the UI's executor without blocking the caller.
pub fn spawn_future<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    #[cfg(target_arch = "wasm32")]
    {
        wasm_bindgen_futures::spawn_local(future);
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        dioxus::prelude::spawn(future);
    }
}

/// Origin of the page serving the app (`scheme://host:port`), web only.
pub fn page_origin() -> Option<String> {
    #[cfg(target_arch = "wasm32")]
    {
        web_sys::window().and_then(|w| w.location().origin().ok())
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        None
    }
}
