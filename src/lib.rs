//! Reader for comprexxion project descriptions.
//!
//! The crate tokenizes and parses a configuration file into a [`Schema`]
//! whose `structure` entry is a [`DirTree`] of the paths to bundle.
//!
//! [`Schema`]: app::models::Schema
//! [`DirTree`]: app::tree::DirTree

pub mod app;
