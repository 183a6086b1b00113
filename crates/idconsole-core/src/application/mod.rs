//! Application services: the wizard engine and the reconciliation service

/// Attribute reconciliation orchestration
pub mod reconciliation_service;

/// Wizard run orchestration
pub mod wizard_engine;
