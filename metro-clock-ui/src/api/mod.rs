mod client;

pub use client::fetch_summary;
