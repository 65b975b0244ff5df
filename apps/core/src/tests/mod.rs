//! Test Module
//!
//! Test suite for the EscapeStress backend.
//!
//! ## Test Categories
//! - `brain_tests`: vectorizer, classifier, annotators, composer and analyzer
//! - `database_tests`: schema management, seeding and CRUD on SQLite
//! - `integration_tests`: HTTP endpoints driven through the router

pub mod integration_tests;
