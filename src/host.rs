//! Line-based console host.
//!
//! Stands in for the live service: it owns the user sessions, the command
//! dispatcher and the placeholder registry, and turns console lines into joins,
//! chat messages and commands. Everything it would show to users is sent as
//! `Text` over an unbounded channel so the caller decides how to print it.

use std::collections::BTreeMap;
use std::sync::Arc;
use log::{debug, info, warn};
use tokio::sync::mpsc;
use crate::commands::{Caller, CommandDispatcher, CommandSource, FeedbackSink};
use crate::config::Config;
use crate::logging::{self, LogLevel};
use crate::placeholders::{PlaceholderContext, PlaceholderRegistry};
use crate::tag::{InitError, StreamerTag};
use crate::text::{Formatting, Text};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Join(String),
    Leave(String),
    Chat { name: String, message: String },
    Broadcast(String),
    ConsoleCommand(String),
    /// `loglevel` reports the current level, `loglevel <level>` changes and saves it.
    LogLevel(Option<String>),
    Who,
    Quit,
    Unknown(String),
}

impl ConsoleInput {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if line.starts_with('/') {
            return Some(ConsoleInput::ConsoleCommand(line.to_string()));
        }

        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };

        let input = match (head.to_lowercase().as_str(), rest) {
            ("quit" | "exit", "") => ConsoleInput::Quit,
            ("who", "") => ConsoleInput::Who,
            ("loglevel", "") => ConsoleInput::LogLevel(None),
            ("loglevel", level) if !level.contains(char::is_whitespace) => {
                ConsoleInput::LogLevel(Some(level.to_string()))
            }
            ("join", name) if is_valid_name(name) => ConsoleInput::Join(name.to_string()),
            ("leave", name) if is_valid_name(name) => ConsoleInput::Leave(name.to_string()),
            ("say", text) if !text.is_empty() => ConsoleInput::Broadcast(text.to_string()),
            _ => match line.split_once(':') {
                Some((name, message)) if is_valid_name(name) && !message.trim().is_empty() => ConsoleInput::Chat {
                    name: name.to_string(),
                    message: message.trim().to_string(),
                },
                _ => ConsoleInput::Unknown(line.to_string()),
            },
        };
        Some(input)
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.len() <= 16 && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Routes feedback into the host's output channel.
pub struct ConsoleSink {
    output: mpsc::UnboundedSender<Text>,
}

#[async_trait::async_trait]
impl FeedbackSink for ConsoleSink {
    async fn send_feedback(&self, recipient: Option<&Caller>, message: Text) {
        let prefix = match recipient {
            Some(caller) => format!("[to {}] ", caller.name),
            None => "[console] ".to_string(),
        };
        let line = Text::styled(prefix, Formatting::Gray).append(message);
        if self.output.send(line).is_err() {
            debug!("Output closed, dropping feedback");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostAction {
    Continue,
    Quit,
}

pub struct ConsoleHost {
    tag: Arc<StreamerTag>,
    placeholders: PlaceholderRegistry,
    commands: CommandDispatcher,
    sessions: BTreeMap<String, Caller>,
    sink: Arc<ConsoleSink>,
    output: mpsc::UnboundedSender<Text>,
    config: Config,
}

impl ConsoleHost {
    pub fn new(
        tag: Arc<StreamerTag>,
        config: &Config,
        output: mpsc::UnboundedSender<Text>,
    ) -> Result<Self, InitError> {
        let mut placeholders = PlaceholderRegistry::new();
        let mut commands = CommandDispatcher::new();
        tag.initialize(&mut placeholders, &mut commands)?;

        Ok(ConsoleHost {
            tag,
            placeholders,
            commands,
            sessions: BTreeMap::new(),
            sink: Arc::new(ConsoleSink { output: output.clone() }),
            output,
            config: config.clone(),
        })
    }

    fn emit(&self, text: Text) {
        if self.output.send(text).is_err() {
            debug!("Output closed, dropping line");
        }
    }

    fn notice(&self, message: impl Into<String>) {
        self.emit(Text::styled(message, Formatting::Yellow));
    }

    pub fn session(&self, name: &str) -> Option<&Caller> {
        self.sessions.get(&name.to_lowercase())
    }

    /// Renders `format` for `ctx`, then fills in the name and message. Placeholders are
    /// resolved first so users cannot smuggle tokens in through their messages.
    pub fn render(&self, format: &str, ctx: &PlaceholderContext, name: &str, message: &str) -> Text {
        self.placeholders
            .render(format, ctx)
            .replace("{name}", name)
            .replace("{message}", message)
    }

    pub async fn handle_line(&mut self, line: &str) -> HostAction {
        match ConsoleInput::parse(line) {
            Some(input) => self.handle(input).await,
            None => HostAction::Continue,
        }
    }

    pub async fn handle(&mut self, input: ConsoleInput) -> HostAction {
        match input {
            ConsoleInput::Join(name) => self.join(&name),
            ConsoleInput::Leave(name) => self.leave(&name),
            ConsoleInput::Chat { name, message } => self.chat(&name, &message).await,
            ConsoleInput::Broadcast(message) => {
                let text = self.render(&self.config.broadcast_format, &PlaceholderContext::server(), "Server", &message);
                self.emit(text);
            }
            ConsoleInput::ConsoleCommand(command) => {
                let source = CommandSource::console(self.sink.clone());
                self.run_command(&command, &source).await;
            }
            ConsoleInput::LogLevel(level) => self.log_level(level.as_deref()),
            ConsoleInput::Who => self.who(),
            ConsoleInput::Quit => return HostAction::Quit,
            ConsoleInput::Unknown(line) => {
                self.notice(format!(
                    "Unrecognised input '{}'. Try: join <name>, leave <name>, <name>: <message>, say <text>, /<command>, loglevel [level], who, quit",
                    line
                ));
            }
        }
        HostAction::Continue
    }

    fn join(&mut self, name: &str) {
        let key = name.to_lowercase();
        if self.sessions.contains_key(&key) {
            self.notice(format!("{} is already connected", name));
            return;
        }
        let caller = Caller::new(name);
        info!("{} joined ({})", caller.name, caller.id);
        self.notice(format!("{} joined the game", caller.name));
        self.sessions.insert(key, caller);
    }

    fn leave(&mut self, name: &str) {
        match self.sessions.remove(&name.to_lowercase()) {
            Some(caller) => {
                info!("{} left ({})", caller.name, caller.id);
                self.tag.on_disconnect(&caller.id);
                self.notice(format!("{} left the game", caller.name));
            }
            None => self.notice(format!("{} is not connected", name)),
        }
    }

    async fn chat(&self, name: &str, message: &str) {
        let Some(caller) = self.session(name).cloned() else {
            self.notice(format!("{} is not connected", name));
            return;
        };

        if message.starts_with('/') {
            let source = CommandSource::player(caller, self.sink.clone());
            self.run_command(message, &source).await;
            return;
        }

        let ctx = PlaceholderContext::for_user(caller.id);
        let text = self.render(&self.config.chat_format, &ctx, &caller.name, message);
        self.emit(text);
    }

    async fn run_command(&self, input: &str, source: &CommandSource) {
        if let Err(e) = self.commands.dispatch(input, source).await {
            warn!("Command '{}' failed: {}", input, e);
            source.send_feedback(Text::styled(e.to_string(), Formatting::Red)).await;
        }
    }

    fn log_level(&mut self, level: Option<&str>) {
        let Some(level) = level else {
            self.notice(format!("Current log level: {}", self.config.log_level));
            return;
        };

        let level = match level.parse::<LogLevel>() {
            Ok(level) => level,
            Err(e) => {
                self.notice(format!("{}. Expected one of: error, warn, info, debug, verbose", e));
                return;
            }
        };

        logging::set_level(level);
        match self.config.set_log_level(level) {
            Ok(()) => self.notice(format!("Log level is now {}", level)),
            Err(e) => {
                warn!("Failed to save config: {}", e);
                self.notice(format!("Log level is now {} (not saved: {})", level, e));
            }
        }
    }

    fn who(&self) {
        if self.sessions.is_empty() {
            self.notice("Nobody is connected");
            return;
        }
        let registry = self.tag.registry();
        let mut text = Text::literal("Connected:");
        for caller in self.sessions.values() {
            text.extend(Text::literal(format!(" {}", caller.name)));
            if registry.is_streaming(&caller.id) {
                text.extend(self.tag.indicator().clone());
            }
        }
        self.emit(text);
    }

    /// Drops all sessions and streaming flags.
    pub fn shutdown(&mut self) {
        info!("Shutting down with {} session(s) open", self.sessions.len());
        self.sessions.clear();
        self.tag.registry().clear();
    }

    pub fn usage(&self) -> Vec<String> {
        self.commands.usage()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streaming::{UserId, VisibilityRegistry};

    fn host() -> (ConsoleHost, mpsc::UnboundedReceiver<Text>) {
        host_with(Config::default())
    }

    fn host_with(config: Config) -> (ConsoleHost, mpsc::UnboundedReceiver<Text>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let tag = StreamerTag::new(VisibilityRegistry::new(), &config);
        (ConsoleHost::new(tag, &config, tx).unwrap(), rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<Text>) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(text) = rx.try_recv() {
            lines.push(text.to_plain());
        }
        lines
    }

    #[test]
    fn parses_console_lines() {
        assert_eq!(ConsoleInput::parse("   "), None);
        assert_eq!(ConsoleInput::parse("join Alice"), Some(ConsoleInput::Join("Alice".to_string())));
        assert_eq!(ConsoleInput::parse("LEAVE bob"), Some(ConsoleInput::Leave("bob".to_string())));
        assert_eq!(
            ConsoleInput::parse("alice: /streaming on"),
            Some(ConsoleInput::Chat { name: "alice".to_string(), message: "/streaming on".to_string() })
        );
        assert_eq!(ConsoleInput::parse("say hi all"), Some(ConsoleInput::Broadcast("hi all".to_string())));
        assert_eq!(
            ConsoleInput::parse("/streaming on"),
            Some(ConsoleInput::ConsoleCommand("/streaming on".to_string()))
        );
        assert_eq!(ConsoleInput::parse("quit"), Some(ConsoleInput::Quit));
        assert_eq!(ConsoleInput::parse("loglevel"), Some(ConsoleInput::LogLevel(None)));
        assert_eq!(
            ConsoleInput::parse("loglevel debug"),
            Some(ConsoleInput::LogLevel(Some("debug".to_string())))
        );
        assert_eq!(ConsoleInput::parse("join"), Some(ConsoleInput::Unknown("join".to_string())));
        assert_eq!(
            ConsoleInput::parse("two words: hi"),
            Some(ConsoleInput::Unknown("two words: hi".to_string()))
        );
    }

    #[tokio::test]
    async fn console_cannot_toggle_streaming() {
        let (mut host, mut rx) = host();

        host.handle_line("/streaming on").await;
        assert_eq!(drain(&mut rx), vec!["[console] A player is required to run this command here"]);
        assert_eq!(host.tag.registry().streaming_count(), 0);
    }

    #[tokio::test]
    async fn chat_from_unknown_user_is_refused() {
        let (mut host, mut rx) = host();

        host.handle_line("ghost: /streaming on").await;
        assert_eq!(drain(&mut rx), vec!["ghost is not connected"]);
        assert_eq!(host.tag.registry().streaming_count(), 0);
    }

    #[tokio::test]
    async fn messages_cannot_inject_placeholders() {
        let (mut host, mut rx) = host();
        host.handle_line("join alice").await;
        host.handle_line("alice: /streaming on").await;
        drain(&mut rx);

        host.handle_line("join bob").await;
        host.handle_line("bob: %streamertag:status%").await;
        let lines = drain(&mut rx);
        assert_eq!(lines.last().map(String::as_str), Some("<bob> %streamertag:status%"));
    }

    #[tokio::test]
    async fn broadcasts_render_without_a_caller() {
        let (mut host, mut rx) = host();
        host.handle_line("join alice").await;
        host.handle_line("alice: /streaming on").await;
        drain(&mut rx);

        host.handle_line("say restart soon").await;
        assert_eq!(drain(&mut rx), vec!["[Server] restart soon"]);
    }

    #[tokio::test]
    async fn who_marks_streaming_users() {
        let (mut host, mut rx) = host();
        host.handle_line("join alice").await;
        host.handle_line("join bob").await;
        host.handle_line("bob: /streaming on").await;
        drain(&mut rx);

        host.handle_line("who").await;
        assert_eq!(drain(&mut rx), vec!["Connected: alice bob[⦿]"]);
    }

    #[tokio::test]
    async fn shutdown_clears_everything() {
        let (mut host, _rx) = host();
        host.handle_line("join alice").await;
        host.handle_line("alice: /streaming on").await;
        assert!(host.tag.registry().is_streaming(&UserId::from_name("alice")));

        host.shutdown();
        assert!(host.session("alice").is_none());
        assert_eq!(host.tag.registry().streaming_count(), 0);
    }

    #[tokio::test]
    async fn loglevel_changes_are_saved() {
        let path = std::env::temp_dir().join(format!("streamertag-host-{}.conf", UserId::random()));
        let config = Config { path: path.clone(), ..Config::default() };
        let (mut host, mut rx) = host_with(config);

        host.handle_line("loglevel").await;
        host.handle_line("loglevel debug").await;
        host.handle_line("loglevel loud").await;
        assert_eq!(
            drain(&mut rx),
            vec![
                "Current log level: INFO",
                "Log level is now DEBUG",
                "unknown log level 'loud'. Expected one of: error, warn, info, debug, verbose",
            ]
        );
        assert_eq!(Config::load(&path).unwrap().log_level, LogLevel::DEBUG);
        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn quit_stops_the_host() {
        let (mut host, _rx) = host();
        assert_eq!(host.handle_line("exit").await, HostAction::Quit);
        assert_eq!(host.handle_line("who").await, HostAction::Continue);
    }
}
