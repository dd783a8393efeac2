pub mod client;
pub mod jupiter;

pub use client::HttpClient;
pub use jupiter::JupiterTokenList;
