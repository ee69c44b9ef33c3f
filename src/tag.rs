use std::sync::Arc;
use log::{debug, info};
use thiserror::Error;
use crate::commands::{CommandDispatcher, CommandError, StreamingCommand};
use crate::config::Config;
use crate::placeholders::{PlaceholderContext, PlaceholderError, PlaceholderId, PlaceholderRegistry, PlaceholderResult};
use crate::streaming::{UserId, VisibilityRegistry};
use crate::text::{Formatting, Text};

pub const MOD_ID: &str = "streamertag";
pub const STATUS_PATH: &str = "status";

#[derive(Error, Debug)]
pub enum InitError {
    #[error(transparent)]
    Placeholder(#[from] PlaceholderError),

    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Wires a `VisibilityRegistry` into the host's placeholder and command systems.
pub struct StreamerTag {
    registry: Arc<VisibilityRegistry>,
    indicator: Text,
    clear_on_disconnect: bool,
}

impl StreamerTag {
    pub fn new(registry: Arc<VisibilityRegistry>, config: &Config) -> Arc<Self> {
        Arc::new(StreamerTag {
            registry,
            indicator: Self::indicator_text(&config.indicator_glyph, config.indicator_brackets),
            clear_on_disconnect: config.clear_on_disconnect,
        })
    }

    // <dark_gray>[</dark_gray><red>glyph</red><dark_gray>]
    fn indicator_text(glyph: &str, brackets: bool) -> Text {
        let glyph = Text::styled(glyph, Formatting::Red);
        if brackets {
            Text::styled("[", Formatting::DarkGray)
                .append(glyph)
                .append(Text::styled("]", Formatting::DarkGray))
        } else {
            glyph
        }
    }

    pub fn status_id() -> PlaceholderId {
        PlaceholderId {
            namespace: MOD_ID.to_string(),
            path: STATUS_PATH.to_string(),
        }
    }

    pub fn registry(&self) -> &Arc<VisibilityRegistry> {
        &self.registry
    }

    pub fn indicator(&self) -> &Text {
        &self.indicator
    }

    /// The `%streamertag:status%` callback. Non-user contexts render nothing.
    pub fn status(&self, ctx: &PlaceholderContext) -> PlaceholderResult {
        match ctx.caller {
            Some(id) if self.registry.is_streaming(&id) => PlaceholderResult::value(self.indicator.clone()),
            _ => PlaceholderResult::value(Text::empty()),
        }
    }

    /// Registers the status placeholder and the `/streaming` command with the host.
    pub fn initialize(
        self: &Arc<Self>,
        placeholders: &mut PlaceholderRegistry,
        commands: &mut CommandDispatcher,
    ) -> Result<(), InitError> {
        info!("Initializing StreamerTag...");

        let tag = Arc::clone(self);
        placeholders.register(Self::status_id(), move |ctx, _arg| tag.status(ctx))?;
        commands.register(Box::new(StreamingCommand::new(Arc::clone(&self.registry))))?;

        info!("StreamerTag initialized!");
        info!("Use '/streaming on' or '/streaming off' to toggle your streaming status.");
        info!("Use placeholder '{}' to display the tag (e.g., in chat).", Self::status_id().token());
        Ok(())
    }

    /// Called by the host when a user's session ends.
    pub fn on_disconnect(&self, id: &UserId) {
        if self.clear_on_disconnect && self.registry.remove(id) {
            debug!("Streaming tag for {} dropped on disconnect", id);
        }
    }
}
