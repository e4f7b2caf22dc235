use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Display aspect ratio classification used to bucket storage keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectRatio {
    /// "16:9"
    Landscape,
    /// "9:16"
    Portrait,
    Other,
}

impl AspectRatio {
    /// Classify a `display_aspect_ratio` string as reported by the prober.
    /// Only the exact strings "16:9" and "9:16" are recognised.
    pub fn from_display_ratio(ratio: Option<&str>) -> Self {
        match ratio {
            Some("16:9") => AspectRatio::Landscape,
            Some("9:16") => AspectRatio::Portrait,
            _ => AspectRatio::Other,
        }
    }

    /// The ratio string this classification stands for.
    pub fn as_ratio_str(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
            AspectRatio::Other => "other",
        }
    }

    /// Directory segment storage keys are placed under.
    pub fn key_prefix(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "landscape",
            AspectRatio::Portrait => "portrait",
            AspectRatio::Other => "other",
        }
    }
}

impl Display for AspectRatio {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_ratio_str())
    }
}
