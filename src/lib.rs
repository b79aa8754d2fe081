//! Intake Sherpa - Guided Weight Management Intake
//!
//! This crate implements a clinical intake interview as a data-driven flow,
//! classifies the collected measurements, and turns the answers into a
//! weight management plan through an external text-generation service.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
