mod client;
pub mod mapper;

pub use client::JiraClient;
