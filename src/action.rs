//! Toolbar Action Surface
//!
//! Icon path construction and the narrow interface to the toolbar button.
//! The icon asset is a single SVG addressed by fragment: the configured
//! variant fragment while any tab is enabled, `#off` otherwise.

use async_trait::async_trait;

use crate::config::IconVariant;
use crate::error::Result;

/// Relative path of the icon asset
pub const ICON_PATH: &str = "img/icon.svg";

/// Keyboard accelerator shown in the toolbar title
pub const ACCEL_KEY: &str = "Alt+Shift+C";

/// Toolbar button surface
#[async_trait]
pub trait ActionSurface: Send + Sync {
    /// Point the toolbar icon at a new asset path
    async fn set_icon(&self, path: &str) -> Result<()>;

    /// Replace the toolbar title
    async fn set_title(&self, title: &str) -> Result<()>;

    /// Enable or disable the button for one tab
    async fn set_tab_enabled(&self, tab_id: i64, enabled: bool) -> Result<()>;
}

/// Icon asset path for the given variant and global enablement
pub fn icon_path(variant: IconVariant, enabled: bool) -> String {
    let fragment = if enabled { variant.fragment() } else { "#off" };
    format!("{ICON_PATH}{fragment}")
}

/// Toolbar title: the product name plus the accelerator
pub fn action_title(name: &str) -> String {
    format!("{name} ({ACCEL_KEY})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_path_enabled_uses_variant_fragment() {
        assert_eq!(icon_path(IconVariant::Gray, true), "img/icon.svg#gray");
        assert_eq!(icon_path(IconVariant::Color, true), "img/icon.svg#color");
        assert_eq!(icon_path(IconVariant::Black, true), "img/icon.svg#black");
        assert_eq!(icon_path(IconVariant::White, true), "img/icon.svg#white");
    }

    #[test]
    fn test_icon_path_disabled_is_off() {
        for variant in [
            IconVariant::Black,
            IconVariant::Color,
            IconVariant::Gray,
            IconVariant::White,
        ] {
            assert_eq!(icon_path(variant, false), "img/icon.svg#off");
        }
    }

    #[test]
    fn test_action_title() {
        assert_eq!(action_title("LinkClip"), "LinkClip (Alt+Shift+C)");
    }
}
