//! Topic extraction: analysis form, parameter sweep and the result session.

mod params;
mod session;
mod sweep;
mod view;

pub use params::{AnalysisForm, AnalysisValidationError};
pub use session::{SweepOutcome, TopicsSession};
pub use sweep::{select_best, SweepForm, SweepMode, SweepValidationError};
pub use view::TopicsView;
