use ratatui::crossterm::style::Color;

/// Accent color applied to normal output lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Green,
    Amber,
    Blue,
}

/// Error lines are always red regardless of the accent.
pub const ERROR_COLOR: Color = Color::Rgb { r: 0xFF, g: 0, b: 0 };

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Green, Theme::Amber, Theme::Blue];

    pub fn id(self) -> &'static str {
        match self {
            Theme::Green => "green",
            Theme::Amber => "amber",
            Theme::Blue => "blue",
        }
    }

    /// Exact, case-sensitive match on a theme id.
    pub fn parse(id: &str) -> Option<Theme> {
        Self::ALL.into_iter().find(|theme| theme.id() == id)
    }

    /// Unknown or missing ids fall back to green.
    pub fn from_arg(arg: Option<&str>) -> Theme {
        arg.and_then(Self::parse).unwrap_or_default()
    }

    pub fn accent(self) -> Color {
        match self {
            Theme::Green => Color::Rgb {
                r: 0x00,
                g: 0xFF,
                b: 0x00,
            },
            Theme::Amber => Color::Rgb {
                r: 0xFF,
                g: 0xBF,
                b: 0x00,
            },
            Theme::Blue => Color::Rgb {
                r: 0x00,
                g: 0xBF,
                b: 0xFF,
            },
        }
    }
}
