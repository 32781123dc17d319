// Startup wiring
pub mod bootstrap;

// Advisory rules
pub mod decision_engine;

// Model loading and inference
pub mod ml;

// Prediction history write/read paths
pub mod persistence;

// Predict / History orchestration
pub mod prediction_service;

// Application assembly and shutdown
pub mod system;
