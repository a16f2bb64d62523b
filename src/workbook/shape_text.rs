/*!
 * Shape text representations.
 *
 * A shape may store its visible text in one of several places and no single
 * place is guaranteed to exist. Reading and writing both walk the same ordered
 * capability list and stop at the first representation that succeeds.
 */

use std::fmt;

use log::trace;

use crate::errors::ShapeTextError;
use super::Shape;

/// Places a shape can hold text, in probing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextRepresentation {
    /// Classic text frame characters; only counts when the frame has text
    RichTextFrame,
    /// Extended (Office 2007+) text frame range
    ExtendedTextFrame,
    /// Alternative (accessibility) text
    AlternativeText,
    /// Text of an embedded OLE object or form control
    EmbeddedObject,
    /// WordArt text effect
    TextEffect,
}

/// First-success-wins order used for probing and write-back
pub const PRIORITY: [TextRepresentation; 5] = [
    TextRepresentation::RichTextFrame,
    TextRepresentation::ExtendedTextFrame,
    TextRepresentation::AlternativeText,
    TextRepresentation::EmbeddedObject,
    TextRepresentation::TextEffect,
];

impl TextRepresentation {
    pub fn label(&self) -> &'static str {
        match self {
            Self::RichTextFrame => "TextFrame",
            Self::ExtendedTextFrame => "TextFrame2",
            Self::AlternativeText => "AlternativeText",
            Self::EmbeddedObject => "OLEFormat",
            Self::TextEffect => "TextEffect",
        }
    }
}

impl fmt::Display for TextRepresentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Every representation that failed during a write-back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteExhausted {
    pub attempts: Vec<(TextRepresentation, ShapeTextError)>,
}

impl fmt::Display for WriteExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.attempts.iter()
            .map(|(repr, err)| format!("{}: {}", repr, err))
            .collect();
        write!(f, "all text representations failed ({})", parts.join("; "))
    }
}

impl std::error::Error for WriteExhausted {}

/// Return the first non-empty text along `PRIORITY`, with the representation it came from
pub fn probe_shape_text(shape: &dyn Shape) -> Option<(TextRepresentation, String)> {
    for repr in PRIORITY {
        match shape.read_text(repr) {
            Ok(text) if !text.is_empty() => return Some((repr, text)),
            Ok(_) => trace!("{}: {} is empty", shape.name(), repr),
            Err(e) => trace!("{}: {} unavailable: {}", shape.name(), repr, e),
        }
    }
    None
}

/// Write `text` through the first representation along `PRIORITY` that accepts it
pub fn write_shape_text(shape: &mut dyn Shape, text: &str) -> Result<TextRepresentation, WriteExhausted> {
    let mut attempts = Vec::new();
    for repr in PRIORITY {
        match shape.write_text(repr, text) {
            Ok(()) => return Ok(repr),
            Err(e) => {
                trace!("{}: write through {} failed: {}", shape.name(), repr, e);
                attempts.push((repr, e));
            }
        }
    }
    Err(WriteExhausted { attempts })
}
