// lib.rs

//! The elements that drive the `log-alerter` binary.
//!
//! An [`Alerter`](alerter::Alerter) watches a single log file and, whenever a new last line
//! appears, strips its `[timestamp] ` prefix and sends the rest to an
//! [`AlertService`](alert::AlertService).

#![warn(
    explicit_outlives_requirements,
    macro_use_extern_crate,
    meta_variable_misuse,
    missing_docs,
    rustdoc::missing_crate_level_docs,
    rustdoc::private_doc_tests,
    single_use_lifetimes,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unused_extern_crates,
    unused_lifetimes,
    variant_size_differences,
    clippy::cargo,
    clippy::pedantic
)]

pub mod alert;
pub mod alerter;
pub mod config;
pub mod error;
pub mod keep_alive;
pub mod line;
pub mod tail;
pub mod watcher;

#[cfg(test)]
pub mod test;
