pub mod observer;
pub mod snapshot;
pub mod undo;
