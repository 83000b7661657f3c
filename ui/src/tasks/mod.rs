pub mod markov;
pub mod metropolis;
pub mod topics;
