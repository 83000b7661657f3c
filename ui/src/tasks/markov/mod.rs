//! Markov text generation: source form, generated text and transition cards.

mod session;
mod view;

pub use session::{MarkovForm, MarkovSession, MarkovValidationError, MIN_SOURCE_CHARS};
pub use view::MarkovView;
