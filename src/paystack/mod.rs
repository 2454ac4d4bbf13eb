pub mod client;

pub use client::{InitializeData, PaystackClient, PaystackError, VerifyData};
