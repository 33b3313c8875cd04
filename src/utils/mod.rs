/// Date and time parsing shared by validation and the availability check
pub mod datetime;
/// Consistent log lines for commands, validation and storage
pub mod logging;
/// Validators for each conversation step
pub mod validation;
