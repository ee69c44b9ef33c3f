use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("No command given. Available: {0}")]
    MissingCommand(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Incomplete command. Usage: {0}")]
    Incomplete(String),

    #[error("Unknown argument '{argument}'. Usage: {usage}")]
    UnknownArgument { argument: String, usage: String },

    #[error("Too many arguments, unexpected '{extra}'. Usage: {usage}")]
    TooManyArguments { extra: String, usage: String },

    #[error("A player is required to run this command here")]
    PlayerRequired,

    #[error("Command /{0} is already registered")]
    AlreadyRegistered(String),
}
