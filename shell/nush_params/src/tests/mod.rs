//! Cross-module scenario tests exercising the engine facade end to end.

mod export_tests;
mod property_tests;
