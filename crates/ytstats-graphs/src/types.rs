//! Chart configuration and styling

use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};
use ytstats_config::ChartSettings;

pub const DEFAULT_VIEW_COUNT_COLOR: RGBColor = RGBColor(31, 119, 180);
pub const DEFAULT_MOVING_AVERAGE_COLOR: RGBColor = RGBColor(255, 127, 14);

/// Axis and legend labels used on both the chart and the workbook
pub const X_AXIS_LABEL: &str = "Upload Date";
pub const Y_AXIS_LABEL: &str = "View Count";
pub const VIEW_COUNT_SERIES: &str = "View Count";
pub const MOVING_AVERAGE_SERIES: &str = "Moving Average";

/// Chart title for a channel
pub fn chart_title(channel_title: &str) -> String {
    format!("View Counts for {channel_title}")
}

/// Graph configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub x_label: String,
    pub y_label: String,
    pub background_color: String,
    pub view_count_color: String,
    pub moving_average_color: String,
    pub show_grid: bool,
    pub show_points: bool,
    pub title_font_size: u32,
    pub label_font_size: u32,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self::from(&ChartSettings::default())
    }
}

impl From<&ChartSettings> for GraphConfig {
    fn from(settings: &ChartSettings) -> Self {
        Self {
            title: "View Counts".to_string(),
            width: settings.width,
            height: settings.height,
            x_label: X_AXIS_LABEL.to_string(),
            y_label: Y_AXIS_LABEL.to_string(),
            background_color: settings.background_color.clone(),
            view_count_color: settings.view_count_color.clone(),
            moving_average_color: settings.moving_average_color.clone(),
            show_grid: settings.show_grid,
            show_points: settings.show_points,
            title_font_size: 24,
            label_font_size: 14,
        }
    }
}

impl GraphConfig {
    /// Title the chart after a channel
    pub fn for_channel(mut self, channel_title: &str) -> Self {
        self.title = chart_title(channel_title);
        self
    }

    pub fn background(&self) -> RGBColor {
        parse_hex_color(&self.background_color).unwrap_or(RGBColor(255, 255, 255))
    }

    pub fn view_count(&self) -> RGBColor {
        parse_hex_color(&self.view_count_color).unwrap_or(DEFAULT_VIEW_COUNT_COLOR)
    }

    pub fn moving_average(&self) -> RGBColor {
        parse_hex_color(&self.moving_average_color).unwrap_or(DEFAULT_MOVING_AVERAGE_COLOR)
    }
}

/// Parse `#RRGGBB` into a color
pub fn parse_hex_color(color: &str) -> Option<RGBColor> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some(RGBColor(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_parsing() {
        assert_eq!(parse_hex_color("#FF0000"), Some(RGBColor(255, 0, 0)));
        assert_eq!(parse_hex_color("#1f77b4"), Some(DEFAULT_VIEW_COUNT_COLOR));
        assert_eq!(parse_hex_color("FF0000"), None);
        assert_eq!(parse_hex_color("#ZZ0000"), None);
        assert_eq!(parse_hex_color("#FFF"), None);
        assert_eq!(parse_hex_color("#ÿÿÿ"), None);
    }

    #[test]
    fn test_from_chart_settings() {
        let settings = ChartSettings {
            width: 800,
            view_count_color: "#000000".to_string(),
            show_grid: false,
            ..ChartSettings::default()
        };
        let config = GraphConfig::from(&settings).for_channel("Tech Talk");

        assert_eq!(config.title, "View Counts for Tech Talk");
        assert_eq!(config.width, 800);
        assert_eq!(config.view_count(), RGBColor(0, 0, 0));
        assert_eq!(config.moving_average(), DEFAULT_MOVING_AVERAGE_COLOR);
        assert!(!config.show_grid);
    }

    #[test]
    fn test_invalid_colors_fall_back() {
        let config = GraphConfig {
            background_color: "white".to_string(),
            view_count_color: "blue".to_string(),
            ..GraphConfig::default()
        };
        assert_eq!(config.background(), RGBColor(255, 255, 255));
        assert_eq!(config.view_count(), DEFAULT_VIEW_COUNT_COLOR);
    }
}
