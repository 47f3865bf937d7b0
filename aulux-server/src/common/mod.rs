mod models;

pub use models::TokenPair;
