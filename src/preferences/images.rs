//! Background image slots around the timer ring.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::PreferenceError;

/// Required prefix of an image value.
const IMAGE_URI_PREFIX: &str = "data:image/";

/// Where an image sits relative to the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImagePosition {
    /// Above the timer
    Top,
    /// Below the timer
    Bottom,
    /// Left of the timer
    Left,
    /// Right of the timer
    Right,
}

impl ImagePosition {
    /// Every position, in display order.
    pub const ALL: [ImagePosition; 4] = [
        ImagePosition::Top,
        ImagePosition::Bottom,
        ImagePosition::Left,
        ImagePosition::Right,
    ];

    /// Returns the key used in the persisted JSON object.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImagePosition::Top => "top",
            ImagePosition::Bottom => "bottom",
            ImagePosition::Left => "left",
            ImagePosition::Right => "right",
        }
    }
}

impl fmt::Display for ImagePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImagePosition {
    type Err = PreferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ImagePosition::ALL
            .into_iter()
            .find(|position| position.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| PreferenceError::UnknownPosition(s.to_string()))
    }
}

/// Checks that `uri` is an image data URI.
///
/// # Errors
///
/// Returns `PreferenceError::InvalidImage` otherwise.
pub fn validate_image_uri(uri: &str) -> Result<(), PreferenceError> {
    let has_prefix = uri
        .get(..IMAGE_URI_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(IMAGE_URI_PREFIX));
    if !has_prefix {
        return Err(PreferenceError::InvalidImage(format!(
            "expected a URI starting with '{IMAGE_URI_PREFIX}'"
        )));
    }
    match uri.split_once(',') {
        Some((_, payload)) if !payload.is_empty() => Ok(()),
        _ => Err(PreferenceError::InvalidImage(
            "data URI has no payload".to_string(),
        )),
    }
}

// ============================================================================
// BackgroundImageSet
// ============================================================================

/// Optional image per position, persisted as `{top, bottom, left, right}`.
///
/// Missing keys in stored JSON read as `None`; every key is written back,
/// with `null` for empty slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundImageSet {
    #[serde(default)]
    pub top: Option<String>,
    #[serde(default)]
    pub bottom: Option<String>,
    #[serde(default)]
    pub left: Option<String>,
    #[serde(default)]
    pub right: Option<String>,
}

impl BackgroundImageSet {
    /// Returns the image at `position`.
    pub fn get(&self, position: ImagePosition) -> Option<&str> {
        self.slot(position).as_deref()
    }

    /// Replaces the image at `position`; `None` clears it.
    ///
    /// # Errors
    ///
    /// Returns `PreferenceError::InvalidImage` if `uri` is not an image data
    /// URI. The set is unchanged in that case.
    pub fn set(
        &mut self,
        position: ImagePosition,
        uri: Option<String>,
    ) -> Result<(), PreferenceError> {
        if let Some(uri) = &uri {
            validate_image_uri(uri)?;
        }
        *self.slot_mut(position) = uri;
        Ok(())
    }

    /// Returns true if an image was supplied for `position`.
    pub fn is_uploaded(&self, position: ImagePosition) -> bool {
        self.slot(position).is_some()
    }

    /// Derives the upload flags from the images present.
    pub fn uploaded_flags(&self) -> UploadedFlags {
        UploadedFlags {
            top: self.is_uploaded(ImagePosition::Top),
            bottom: self.is_uploaded(ImagePosition::Bottom),
            left: self.is_uploaded(ImagePosition::Left),
            right: self.is_uploaded(ImagePosition::Right),
        }
    }

    /// Returns true if no position has an image.
    pub fn is_empty(&self) -> bool {
        ImagePosition::ALL.iter().all(|p| !self.is_uploaded(*p))
    }

    fn slot(&self, position: ImagePosition) -> &Option<String> {
        match position {
            ImagePosition::Top => &self.top,
            ImagePosition::Bottom => &self.bottom,
            ImagePosition::Left => &self.left,
            ImagePosition::Right => &self.right,
        }
    }

    fn slot_mut(&mut self, position: ImagePosition) -> &mut Option<String> {
        match position {
            ImagePosition::Top => &mut self.top,
            ImagePosition::Bottom => &mut self.bottom,
            ImagePosition::Left => &mut self.left,
            ImagePosition::Right => &mut self.right,
        }
    }
}

/// Which positions have an image. Computed, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadedFlags {
    /// Top slot holds an image
    pub top: bool,
    /// Bottom slot holds an image
    pub bottom: bool,
    /// Left slot holds an image
    pub left: bool,
    /// Right slot holds an image
    pub right: bool,
}
