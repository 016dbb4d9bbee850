use ansi_term::{Colour, Style};

use crate::config::ColorSettings;

/// What a piece of output means, independent of how it is colored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Muted,
    Heading,
    Accent,
    Positive,
    Negative,
}

/// Maps each role to a terminal style
#[derive(Debug, Clone)]
pub struct Palette {
    muted: Style,
    heading: Style,
    accent: Style,
    positive: Style,
    negative: Style,
}

impl Palette {
    pub fn from_settings(colors: &ColorSettings) -> Self {
        let bold = |index: u8| Colour::Fixed(index).bold();
        Self {
            muted: bold(colors.muted),
            heading: bold(colors.heading),
            accent: bold(colors.accent),
            positive: bold(colors.positive),
            negative: bold(colors.negative),
        }
    }

    /// No escape codes at all
    pub fn plain() -> Self {
        Self {
            muted: Style::new(),
            heading: Style::new(),
            accent: Style::new(),
            positive: Style::new(),
            negative: Style::new(),
        }
    }

    pub fn style(&self, role: Role) -> Style {
        match role {
            Role::Muted => self.muted,
            Role::Heading => self.heading,
            Role::Accent => self.accent,
            Role::Positive => self.positive,
            Role::Negative => self.negative,
        }
    }

    pub fn paint(&self, role: Role, text: &str) -> String {
        self.style(role).paint(text).to_string()
    }
}
