pub mod comments;
pub mod core;
pub mod format;
pub mod marks;
pub mod reports;
