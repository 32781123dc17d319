// Advisory labels
pub mod advisory;

// Domain-specific error types
pub mod errors;

// Request feature rows
pub mod features;

// Inference results and stored records
pub mod prediction;

// Repository traits
pub mod repositories;
