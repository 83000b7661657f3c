mod home;
pub use home::Home;

mod markov;
pub use markov::Markov;

mod metropolis;
pub use metropolis::Metropolis;

mod topics;
pub use topics::Topics;
