use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use log::debug;
use thiserror::Error;
use crate::streaming::UserId;
use crate::text::Text;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PlaceholderError {
    #[error("Invalid placeholder id '{0}', expected namespace:path")]
    InvalidId(String),

    #[error("Placeholder {0} is already registered")]
    AlreadyRegistered(PlaceholderId),
}

/// `namespace:path`, e.g. `streamertag:status`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlaceholderId {
    pub namespace: String,
    pub path: String,
}

impl PlaceholderId {
    pub fn of(namespace: &str, path: &str) -> Result<Self, PlaceholderError> {
        if !is_valid_part(namespace) || !is_valid_part(path) {
            return Err(PlaceholderError::InvalidId(format!("{}:{}", namespace, path)));
        }
        Ok(PlaceholderId {
            namespace: namespace.to_string(),
            path: path.to_string(),
        })
    }

    /// The template token for this id, e.g. `%streamertag:status%`.
    pub fn token(&self) -> String {
        format!("%{}%", self)
    }
}

fn is_valid_part(part: &str) -> bool {
    !part.is_empty()
        && part
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '.' | '-'))
}

impl fmt::Display for PlaceholderId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl FromStr for PlaceholderId {
    type Err = PlaceholderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (namespace, path) = s
            .split_once(':')
            .ok_or_else(|| PlaceholderError::InvalidId(s.to_string()))?;
        PlaceholderId::of(namespace, path)
    }
}

/// Who the text is being rendered for. No caller means a non-user context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaceholderContext {
    pub caller: Option<UserId>,
}

impl PlaceholderContext {
    pub fn for_user(id: UserId) -> Self {
        PlaceholderContext { caller: Some(id) }
    }

    pub fn server() -> Self {
        PlaceholderContext { caller: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderResult {
    Value(Text),
    /// The handler declined; the token is left as written.
    Invalid(String),
}

impl PlaceholderResult {
    pub fn value(text: Text) -> Self {
        PlaceholderResult::Value(text)
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        PlaceholderResult::Invalid(reason.into())
    }
}

pub type PlaceholderHandler =
    Arc<dyn Fn(&PlaceholderContext, Option<&str>) -> PlaceholderResult + Send + Sync>;

#[derive(Default)]
pub struct PlaceholderRegistry {
    handlers: HashMap<PlaceholderId, PlaceholderHandler>,
}

impl PlaceholderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, id: PlaceholderId, handler: F) -> Result<(), PlaceholderError>
    where
        F: Fn(&PlaceholderContext, Option<&str>) -> PlaceholderResult + Send + Sync + 'static,
    {
        if self.handlers.contains_key(&id) {
            return Err(PlaceholderError::AlreadyRegistered(id));
        }
        debug!("Registered placeholder {}", id.token());
        self.handlers.insert(id, Arc::new(handler));
        Ok(())
    }

    pub fn is_registered(&self, id: &PlaceholderId) -> bool {
        self.handlers.contains_key(id)
    }

    /// Resolves a single token body (`ns:path` or `ns:path arg`).
    fn resolve(&self, body: &str, ctx: &PlaceholderContext) -> Option<Text> {
        let (id, arg) = match body.split_once(' ') {
            Some((id, arg)) => (id, Some(arg)),
            None => (body, None),
        };
        let id = id.parse::<PlaceholderId>().ok()?;
        let handler = self.handlers.get(&id)?;
        match handler(ctx, arg) {
            PlaceholderResult::Value(text) => Some(text),
            PlaceholderResult::Invalid(reason) => {
                debug!("Placeholder {} declined: {}", id, reason);
                None
            }
        }
    }

    /// Substitutes every `%ns:path%` token in `template`. Tokens that do not resolve
    /// stay in the output as written; `%%` renders a single `%`.
    pub fn render(&self, template: &str, ctx: &PlaceholderContext) -> Text {
        let mut out = Text::empty();
        let mut literal = String::new();
        let mut rest = template;

        while let Some(start) = rest.find('%') {
            literal.push_str(&rest[..start]);
            let after = &rest[start + 1..];

            if let Some(stripped) = after.strip_prefix('%') {
                literal.push('%');
                rest = stripped;
                continue;
            }

            let Some(end) = after.find('%') else {
                literal.push('%');
                rest = after;
                continue;
            };

            let body = &after[..end];
            match self.resolve(body, ctx) {
                Some(text) => {
                    out.extend(Text::literal(std::mem::take(&mut literal)));
                    out.extend(text);
                    rest = &after[end + 1..];
                }
                None => {
                    // Keep the opening '%' and rescan from the closing one, so it can
                    // start the next token.
                    literal.push('%');
                    literal.push_str(body);
                    rest = &after[end..];
                }
            }
        }

        literal.push_str(rest);
        out.extend(Text::literal(literal));
        out
    }
}
