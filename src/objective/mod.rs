mod objective;

pub use objective::{evaluate_objectives, Objective, ObjectiveMeasure, ObjectiveResult, ObjectiveStatus};
