pub mod bayesian_network;
pub mod enumeration;

// Re-export the BayesianNetwork for easy access
pub use bayesian_network::BayesianNetwork;
