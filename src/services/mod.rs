pub mod alerts;
pub mod evaluator;
pub mod health;
pub mod notifier;
