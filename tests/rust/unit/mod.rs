//! Unit tests - configuration loading and the lookup tables behind the compiler
//!
//! These tests exercise single components through the public API without compiling
//! whole query models.

mod alias_generator_tests;
mod config_tests;
mod registry_tests;
