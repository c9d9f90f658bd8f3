pub mod content;
pub mod form_controller;
pub mod sessions;
pub mod submission_log;
pub mod validation;
