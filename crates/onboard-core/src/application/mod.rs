/// Step handler ports
pub mod handlers;

/// Toggle service
pub mod toggle_service;

/// Provisioning orchestrator
pub mod orchestrator;

/// Orchestrator builder and store selection
pub mod provider;
