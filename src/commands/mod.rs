mod command_system;
mod errors;
mod streaming;

pub use command_system::{Caller, Command, CommandDispatcher, CommandSource, FeedbackSink, SINGLE_SUCCESS};
pub use errors::CommandError;
pub use streaming::StreamingCommand;
