//! Chart configuration.

use serde::{Deserialize, Serialize};

use crate::model::timeline::ViewMode;

/// Tunable knobs for a chart. Every field has a default, so hosts can
/// deserialize a partial settings object and get the rest filled in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Scale the chart opens in.
    pub view_mode: ViewMode,
    /// Zoom ladder, finest first. `zoom_in`/`zoom_out` walk this list.
    pub view_modes: Vec<ViewMode>,
    pub bar_height: f64,
    pub bar_corner_radius: f64,
    /// Radius of the quarter-arc in dependency arrows.
    pub arrow_curve: f64,
    /// Vertical gap between rows; also the arrow stand-off distance.
    pub padding: f64,
    pub header_height: f64,
    /// Month-name language for axis labels.
    pub language: String,
    /// Allow vertical drag to reorder rows.
    pub sortable: bool,
    /// "click" fires a click event on a press-and-release without
    /// movement; anything else suppresses it.
    pub popup_trigger: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::Day,
            view_modes: vec![
                ViewMode::QuarterDay,
                ViewMode::HalfDay,
                ViewMode::Day,
                ViewMode::Week,
                ViewMode::Month,
                ViewMode::Year,
            ],
            bar_height: 20.0,
            bar_corner_radius: 3.0,
            arrow_curve: 5.0,
            padding: 18.0,
            header_height: 50.0,
            language: "en".to_string(),
            sortable: false,
            popup_trigger: "click".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let opts = Options::default();
        assert_eq!(opts.view_mode, ViewMode::Day);
        assert_eq!(opts.bar_height, 20.0);
        assert_eq!(opts.padding, 18.0);
        assert_eq!(opts.header_height, 50.0);
        assert_eq!(opts.view_modes.len(), 6);
    }

    #[test]
    fn partial_settings_fill_in_defaults() {
        let opts: Options = serde_json::from_str(r#"{"view_mode":"Week","sortable":true}"#)
            .expect("valid settings");
        assert_eq!(opts.view_mode, ViewMode::Week);
        assert!(opts.sortable);
        assert_eq!(opts.language, "en");
    }
}
