use std::borrow::Cow;

use serde::Deserialize;
use unicode_normalization::{is_nfc_quick, IsNormalized, UnicodeNormalization};

/// Unicode normalization applied to tweet content before tokenization.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    None,
    Nfc,
}

impl Default for Normalization {
    fn default() -> Self {
        Normalization::Nfc
    }
}

pub fn normalize(text: &str, normalization: Normalization) -> Cow<'_, str> {
    match normalization {
        Normalization::None => Cow::Borrowed(text),
        Normalization::Nfc => match is_nfc_quick(text.chars()) {
            IsNormalized::Yes => Cow::Borrowed(text),
            _ => Cow::Owned(text.nfc().collect()),
        },
    }
}
