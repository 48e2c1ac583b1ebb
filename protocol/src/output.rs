//! Console output parsing and color handling.
//!
//! Servers embed colors as a caret followed by one digit (`^1red^7 plain`).
//! Each line of an `rcon` reply becomes an [`Output`]: a list of [`Run`]s
//! whose color is the last escape seen on that line.

use crate::framing::{decode_text, strip_marker};
use crate::route::{strip_header, PRINT_HEADER};

/// Byte that introduces a color escape.
pub const COLOR_ESCAPE: u8 = b'^';

/// Line terminator used by the server in console replies.
pub const LINE_TERMINATOR: char = '\n';

/// Colored palette slots. Slot 7 is the default text color and is
/// represented as the absence of a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Cyan,
    Magenta,
    Orange,
    Gray,
}

impl Color {
    /// Maps an escape digit (`b'0'..=b'9'`) to its palette slot.
    ///
    /// Returns `None` for `7`, the default color, and for non-digits.
    pub fn from_digit(digit: u8) -> Option<Color> {
        match digit {
            b'0' => Some(Color::Black),
            b'1' => Some(Color::Red),
            b'2' => Some(Color::Green),
            b'3' => Some(Color::Yellow),
            b'4' => Some(Color::Blue),
            b'5' => Some(Color::Cyan),
            b'6' => Some(Color::Magenta),
            b'8' => Some(Color::Orange),
            b'9' => Some(Color::Gray),
            _ => None,
        }
    }

    /// Palette index of this color, the digit used in its escape.
    pub fn index(self) -> u8 {
        match self {
            Color::Black => 0,
            Color::Red => 1,
            Color::Green => 2,
            Color::Yellow => 3,
            Color::Blue => 4,
            Color::Cyan => 5,
            Color::Magenta => 6,
            Color::Orange => 8,
            Color::Gray => 9,
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            Color::Black => "#000000",
            Color::Red => "#ff0000",
            Color::Green => "#00ff00",
            Color::Yellow => "#ffff00",
            Color::Blue => "#0000ff",
            Color::Cyan => "#00ffff",
            Color::Magenta => "#ff00ff",
            Color::Orange => "#ff8000",
            Color::Gray => "#808080",
        }
    }

    /// SGR parameters for terminal rendering.
    pub fn ansi(self) -> &'static str {
        match self {
            Color::Black => "30",
            Color::Red => "31",
            Color::Green => "32",
            Color::Yellow => "33",
            Color::Blue => "34",
            Color::Cyan => "36",
            Color::Magenta => "35",
            Color::Orange => "38;5;208",
            Color::Gray => "90",
        }
    }
}

/// A stretch of text sharing one color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    /// `None` for text before the first escape or after a `^7`.
    pub color: Option<Color>,
}

impl Run {
    pub fn new(text: impl Into<String>, color: Option<Color>) -> Self {
        Self {
            text: text.into(),
            color,
        }
    }
}

/// One logical line of console output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Output {
    runs: Vec<Run>,
}

impl Output {
    /// Splits a single line into colored runs.
    pub fn from_line(line: &str) -> Self {
        let runs = Segments::new(line)
            .map(|(text, color)| Run::new(text, color))
            .collect();
        Self { runs }
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn to_plain_text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    /// Renders the line as HTML, one `<span>` per colored run.
    pub fn to_markup(&self) -> String {
        let mut markup = String::new();
        for run in self.runs.iter().filter(|run| !run.text.is_empty()) {
            match run.color {
                Some(color) => {
                    markup.push_str("<span style=\"color:");
                    markup.push_str(color.hex());
                    markup.push_str("\">");
                    escape_html_into(&run.text, &mut markup);
                    markup.push_str("</span>");
                }
                None => escape_html_into(&run.text, &mut markup),
            }
        }
        markup
    }

    /// Renders the line with ANSI escape sequences for a terminal.
    pub fn to_ansi(&self) -> String {
        let mut rendered = String::new();
        for run in self.runs.iter().filter(|run| !run.text.is_empty()) {
            match run.color {
                Some(color) => {
                    rendered.push_str("\x1b[");
                    rendered.push_str(color.ansi());
                    rendered.push('m');
                    rendered.push_str(&run.text);
                    rendered.push_str("\x1b[0m");
                }
                None => rendered.push_str(&run.text),
            }
        }
        rendered
    }
}

/// Stateless parser for console replies.
pub struct OutputParser;

impl OutputParser {
    /// Parses a console reply into one [`Output`] per line.
    ///
    /// A leading out-of-band marker and `print` header line are removed if
    /// present. A trailing line terminator does not produce an empty line.
    pub fn parse(raw: &[u8]) -> Vec<Output> {
        let payload = strip_marker(raw);
        let body = strip_header(payload, PRINT_HEADER).unwrap_or(payload);
        if body.is_empty() {
            return Vec::new();
        }

        let decoded = decode_text(body);
        let text = decoded.strip_suffix(LINE_TERMINATOR).unwrap_or(&decoded);
        text.split(LINE_TERMINATOR).map(Output::from_line).collect()
    }
}

/// Removes every color escape from `text`.
pub fn remove_colors(text: &str) -> String {
    Segments::new(text).map(|(text, _)| text).collect()
}

/// Iterator over the non-empty `(text, color)` stretches of a string.
struct Segments<'a> {
    text: &'a str,
    pos: usize,
    color: Option<Color>,
}

impl<'a> Segments<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            color: None,
        }
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = (&'a str, Option<Color>);

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.text.as_bytes();

        while self.pos < bytes.len() {
            let start = self.pos;
            let color = self.color;
            let mut i = start;

            // Escapes are ASCII, so every split point is a char boundary.
            while i < bytes.len() {
                if bytes[i] == COLOR_ESCAPE && bytes.get(i + 1).is_some_and(u8::is_ascii_digit) {
                    break;
                }
                i += 1;
            }

            if i < bytes.len() {
                self.color = Color::from_digit(bytes[i + 1]);
                self.pos = i + 2;
            } else {
                self.pos = i;
            }

            if i > start {
                return Some((&self.text[start..i], color));
            }
        }

        None
    }
}

fn escape_html_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}
