pub mod advisory;
pub mod outcome;
