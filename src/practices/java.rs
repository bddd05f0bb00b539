//! Practices for JVM projects.

pub mod log4j_configured;

pub use log4j_configured::JavaLog4JConfiguredPractice;
