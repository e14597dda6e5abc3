//! Integration tests for koradi-archiver

mod pipeline_tests;
