use std::sync::Arc;
use log::info;
use crate::streaming::VisibilityRegistry;
use crate::text::{Formatting, Text};
use super::{Command, CommandError, CommandSource, SINGLE_SUCCESS};

/// `/streaming on|off`: toggles the caller's streaming tag.
pub struct StreamingCommand {
    registry: Arc<VisibilityRegistry>,
}

impl StreamingCommand {
    pub fn new(registry: Arc<VisibilityRegistry>) -> Self {
        StreamingCommand { registry }
    }

    fn confirmation(enabled: bool) -> Text {
        let (state, color, suffix) = if enabled {
            ("ON", Formatting::Green, ". Your tag is now visible.")
        } else {
            ("OFF", Formatting::Red, ". Your tag is now hidden.")
        };
        Text::literal("Streaming mode ")
            .append(Text::styled(state, color))
            .append(Text::literal(suffix))
    }

    async fn set(&self, source: &CommandSource, enabled: bool) -> Result<i32, CommandError> {
        let caller = source.player_or_err()?;
        self.registry.set_streaming(caller.id, enabled);
        info!("{} turned streaming mode {}", caller.name, if enabled { "on" } else { "off" });
        source.send_feedback(Self::confirmation(enabled)).await;
        Ok(SINGLE_SUCCESS)
    }
}

#[async_trait::async_trait]
impl Command for StreamingCommand {
    fn name(&self) -> &'static str {
        "streaming"
    }

    fn description(&self) -> &'static str {
        "Toggles your streaming tag"
    }

    fn usage(&self) -> String {
        "/streaming <on|off>".to_string()
    }

    fn requires_player(&self) -> bool {
        true
    }

    async fn execute(&self, source: &CommandSource, args: Vec<String>) -> Result<i32, CommandError> {
        if let Some(extra) = args.get(1) {
            return Err(CommandError::TooManyArguments {
                extra: extra.clone(),
                usage: self.usage(),
            });
        }

        match args.first().map(String::as_str) {
            Some("on") => self.set(source, true).await,
            Some("off") => self.set(source, false).await,
            Some(other) => Err(CommandError::UnknownArgument {
                argument: other.to_string(),
                usage: self.usage(),
            }),
            None => Err(CommandError::Incomplete(self.usage())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{Caller, FeedbackSink};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        messages: Mutex<Vec<(Option<String>, String)>>,
    }

    #[async_trait::async_trait]
    impl FeedbackSink for RecordingSink {
        async fn send_feedback(&self, recipient: Option<&Caller>, message: Text) {
            self.messages
                .lock()
                .push((recipient.map(|c| c.name.clone()), message.to_plain()));
        }
    }

    fn setup() -> (StreamingCommand, Arc<VisibilityRegistry>, Arc<RecordingSink>, CommandSource) {
        let registry = VisibilityRegistry::new();
        let sink = Arc::new(RecordingSink::default());
        let source = CommandSource::player(Caller::new("alice"), sink.clone());
        (StreamingCommand::new(Arc::clone(&registry)), registry, sink, source)
    }

    #[tokio::test]
    async fn on_sets_flag_and_confirms_privately() {
        let (command, registry, sink, source) = setup();

        let status = command.execute(&source, vec!["on".to_string()]).await;
        assert_eq!(status, Ok(SINGLE_SUCCESS));
        assert!(registry.is_streaming(&Caller::new("alice").id));
        assert_eq!(
            sink.messages.lock().as_slice(),
            &[(Some("alice".to_string()), "Streaming mode ON. Your tag is now visible.".to_string())]
        );
    }

    #[tokio::test]
    async fn off_clears_flag_even_if_never_set() {
        let (command, registry, sink, source) = setup();

        let status = command.execute(&source, vec!["off".to_string()]).await;
        assert_eq!(status, Ok(SINGLE_SUCCESS));
        assert_eq!(registry.streaming_count(), 0);
        assert_eq!(
            sink.messages.lock()[0].1,
            "Streaming mode OFF. Your tag is now hidden."
        );
    }

    #[test]
    fn confirmation_colours_the_state_word() {
        let on = StreamingCommand::confirmation(true);
        assert_eq!(on.spans()[1].content, "ON");
        assert_eq!(on.spans()[1].color, Some(Formatting::Green));

        let off = StreamingCommand::confirmation(false);
        assert_eq!(off.spans()[1].content, "OFF");
        assert_eq!(off.spans()[1].color, Some(Formatting::Red));
    }

    #[tokio::test]
    async fn bad_arguments_leave_state_untouched() {
        let (command, registry, sink, source) = setup();

        assert!(matches!(
            command.execute(&source, vec![]).await,
            Err(CommandError::Incomplete(_))
        ));
        assert!(matches!(
            command.execute(&source, vec!["maybe".to_string()]).await,
            Err(CommandError::UnknownArgument { .. })
        ));
        assert_eq!(registry.streaming_count(), 0);
        assert!(sink.messages.lock().is_empty());
    }

    #[tokio::test]
    async fn subcommands_are_case_sensitive_literals() {
        let (command, registry, sink, source) = setup();

        assert_eq!(
            command.execute(&source, vec!["ON".to_string()]).await,
            Err(CommandError::UnknownArgument {
                argument: "ON".to_string(),
                usage: "/streaming <on|off>".to_string(),
            })
        );
        assert_eq!(registry.streaming_count(), 0);
        assert!(sink.messages.lock().is_empty());
    }

    #[tokio::test]
    async fn trailing_arguments_are_rejected() {
        let (command, registry, sink, source) = setup();

        let result = command
            .execute(&source, vec!["on".to_string(), "please-dont".to_string()])
            .await;
        assert_eq!(
            result,
            Err(CommandError::TooManyArguments {
                extra: "please-dont".to_string(),
                usage: "/streaming <on|off>".to_string(),
            })
        );
        assert_eq!(registry.streaming_count(), 0);
        assert!(sink.messages.lock().is_empty());
    }
}
