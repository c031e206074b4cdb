// JSON transport for the RiskOps service

pub mod client;

#[cfg(test)]
mod test;

pub use client::HttpTransport;
