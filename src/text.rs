//! Styled chat text.
//!
//! A `Text` is an ordered run of spans, each optionally coloured with one of the
//! legacy chat palette colours. Hosts render it either plain or as ANSI.

use std::fmt;
use colored::{Color, Colorize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Formatting {
    Black,
    DarkBlue,
    DarkGreen,
    DarkAqua,
    DarkRed,
    DarkPurple,
    Gold,
    Gray,
    DarkGray,
    Blue,
    Green,
    Aqua,
    Red,
    LightPurple,
    Yellow,
    White,
}

impl Formatting {
    fn ansi(self) -> Color {
        match self {
            Formatting::Black => Color::Black,
            Formatting::DarkBlue => Color::Blue,
            Formatting::DarkGreen => Color::Green,
            Formatting::DarkAqua => Color::Cyan,
            Formatting::DarkRed => Color::Red,
            Formatting::DarkPurple => Color::Magenta,
            Formatting::Gold => Color::Yellow,
            Formatting::Gray => Color::White,
            Formatting::DarkGray => Color::BrightBlack,
            Formatting::Blue => Color::BrightBlue,
            Formatting::Green => Color::BrightGreen,
            Formatting::Aqua => Color::BrightCyan,
            Formatting::Red => Color::BrightRed,
            Formatting::LightPurple => Color::BrightMagenta,
            Formatting::Yellow => Color::BrightYellow,
            Formatting::White => Color::BrightWhite,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub content: String,
    pub color: Option<Formatting>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Text {
    spans: Vec<Span>,
}

impl Text {
    pub fn empty() -> Self {
        Text::default()
    }

    pub fn literal(content: impl Into<String>) -> Self {
        Self::span(content.into(), None)
    }

    pub fn styled(content: impl Into<String>, color: Formatting) -> Self {
        Self::span(content.into(), Some(color))
    }

    fn span(content: String, color: Option<Formatting>) -> Self {
        if content.is_empty() {
            return Text::empty();
        }
        Text {
            spans: vec![Span { content, color }],
        }
    }

    pub fn append(mut self, other: Text) -> Self {
        self.extend(other);
        self
    }

    pub fn extend(&mut self, other: Text) {
        for span in other.spans {
            match self.spans.last_mut() {
                Some(last) if last.color == span.color => last.content.push_str(&span.content),
                _ => self.spans.push(span),
            }
        }
    }

    /// Replaces `from` with `to` inside every span, keeping span styles.
    pub fn replace(&self, from: &str, to: &str) -> Text {
        let mut out = Text::empty();
        for span in &self.spans {
            out.extend(Self::span(span.content.replace(from, to), span.color));
        }
        out
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn to_plain(&self) -> String {
        self.spans.iter().map(|s| s.content.as_str()).collect()
    }

    pub fn to_ansi(&self) -> String {
        self.spans
            .iter()
            .map(|s| match s.color {
                Some(color) => s.content.color(color.ansi()).to_string(),
                None => s.content.clone(),
            })
            .collect()
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_plain())
    }
}
