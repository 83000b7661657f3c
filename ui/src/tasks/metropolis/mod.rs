//! Metropolis-Hastings sampling: target selection, trace with burn-in,
//! marginal histogram and joint density.

mod params;
mod session;
mod view;

pub use params::{DistributionKind, MetropolisForm, MetropolisValidationError, ParamField};
pub use session::MetropolisSession;
pub use view::MetropolisView;
