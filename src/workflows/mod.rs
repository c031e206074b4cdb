// Workflow orchestration: the controller and the view model it owns

pub mod controller;
pub mod view_model;


pub use controller::{ConflictPolicy, Intent, WorkflowController};
pub use view_model::{BusyFlags, Operation, ViewModel};
