pub mod catalog;
pub mod propagation;
pub mod scheduled;
