use std::collections::BTreeMap;
use std::sync::Arc;
use log::{debug, warn};
use crate::streaming::UserId;
use crate::text::Text;
use super::CommandError;

pub const SINGLE_SUCCESS: i32 = 1;

/// An identified user issuing a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub id: UserId,
    pub name: String,
}

impl Caller {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Caller {
            id: UserId::from_name(&name),
            name,
        }
    }
}

/// Delivers command feedback. `None` as recipient means the console.
#[async_trait::async_trait]
pub trait FeedbackSink: Send + Sync {
    async fn send_feedback(&self, recipient: Option<&Caller>, message: Text);
}

#[derive(Clone)]
pub struct CommandSource {
    pub caller: Option<Caller>,
    sink: Arc<dyn FeedbackSink>,
}

impl CommandSource {
    pub fn player(caller: Caller, sink: Arc<dyn FeedbackSink>) -> Self {
        CommandSource { caller: Some(caller), sink }
    }

    pub fn console(sink: Arc<dyn FeedbackSink>) -> Self {
        CommandSource { caller: None, sink }
    }

    pub fn player_or_err(&self) -> Result<&Caller, CommandError> {
        self.caller.as_ref().ok_or(CommandError::PlayerRequired)
    }

    /// Sends a message privately to whoever issued the command.
    pub async fn send_feedback(&self, message: Text) {
        self.sink.send_feedback(self.caller.as_ref(), message).await;
    }
}

#[async_trait::async_trait]
pub trait Command: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn usage(&self) -> String {
        format!("/{}", self.name())
    }

    /// Player-only commands are rejected by the dispatcher before `execute` runs.
    fn requires_player(&self) -> bool {
        false
    }

    async fn execute(&self, source: &CommandSource, args: Vec<String>) -> Result<i32, CommandError>;
}

#[derive(Default)]
pub struct CommandDispatcher {
    commands: BTreeMap<String, Box<dyn Command>>,
}

impl CommandDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, command: Box<dyn Command>) -> Result<(), CommandError> {
        let name = command.name().to_string();
        if self.commands.contains_key(&name) {
            return Err(CommandError::AlreadyRegistered(name));
        }
        debug!("Registered command /{}", name);
        self.commands.insert(name, command);
        Ok(())
    }

    /// Command names are literals and match exactly.
    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        self.commands.get(name).map(|c| &**c)
    }

    pub async fn dispatch(&self, input: &str, source: &CommandSource) -> Result<i32, CommandError> {
        let input = input.trim();
        let input = input.strip_prefix('/').unwrap_or(input);
        let mut parts = input.split_whitespace();

        let name = parts
            .next()
            .ok_or_else(|| CommandError::MissingCommand(self.names().join(", ")))?;
        let command = self
            .get(name)
            .ok_or_else(|| CommandError::UnknownCommand(name.to_string()))?;

        if command.requires_player() && source.caller.is_none() {
            warn!("Rejected /{} from a source without a player", command.name());
            return Err(CommandError::PlayerRequired);
        }

        let args: Vec<String> = parts.map(str::to_string).collect();
        match &source.caller {
            Some(caller) => debug!("{} issued /{} {:?}", caller.name, command.name(), args),
            None => debug!("Console issued /{} {:?}", command.name(), args),
        }

        command.execute(source, args).await
    }

    pub fn names(&self) -> Vec<String> {
        self.commands.keys().map(|name| format!("/{}", name)).collect()
    }

    pub fn usage(&self) -> Vec<String> {
        self.commands
            .values()
            .map(|c| format!("{} - {}", c.usage(), c.description()))
            .collect()
    }
}
