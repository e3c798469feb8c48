pub mod host;
pub mod logging;
pub mod report;
pub mod tool_validator;
