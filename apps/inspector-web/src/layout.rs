use inspector_core::{OverlayConfig, PanelPosition, Placement};
use tracing::warn;

const ANCHOR_OFFSET: &str = "20px";

/// Where a finished drag left the panel, from its rendered box. `None` when
/// the box has no usable coordinates.
pub(crate) fn rendered_position(left: f64, top: f64) -> Option<PanelPosition> {
    Some(PanelPosition::new(left, top)).filter(PanelPosition::is_finite)
}

pub(crate) fn px(value: f64) -> String {
    format!("{value}px")
}

/// Inline `left`/`top`/`right`/`bottom` values for a placement.
pub(crate) fn placement_styles(placement: Placement) -> [(&'static str, String); 4] {
    match placement {
        Placement::Anchored => [
            ("left", "auto".to_string()),
            ("top", "auto".to_string()),
            ("right", ANCHOR_OFFSET.to_string()),
            ("bottom", ANCHOR_OFFSET.to_string()),
        ],
        Placement::At(position) => [
            ("left", px(position.left)),
            ("top", px(position.top)),
            ("right", "auto".to_string()),
            ("bottom", "auto".to_string()),
        ],
    }
}

/// Operator config from the page global, serialized as JSON. Missing or
/// invalid input falls back to defaults.
pub(crate) fn config_from_global(raw: Option<&str>) -> OverlayConfig {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return OverlayConfig::default();
    };
    match OverlayConfig::from_json(raw) {
        Ok(config) => config,
        Err(error) => {
            warn!(%error, "ignoring inspector config, using defaults");
            OverlayConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_box_is_kept_even_when_never_moved() {
        assert_eq!(
            rendered_position(1_180.0, 642.5),
            Some(PanelPosition::new(1_180.0, 642.5))
        );
        assert_eq!(rendered_position(0.0, 0.0), Some(PanelPosition::new(0.0, 0.0)));
        assert_eq!(rendered_position(f64::NAN, 10.0), None);
        assert_eq!(rendered_position(10.0, f64::INFINITY), None);
    }

    #[test]
    fn placement_switches_between_anchor_and_left_top() {
        let anchored = placement_styles(Placement::Anchored);
        assert_eq!(anchored[2], ("right", "20px".to_string()));
        assert_eq!(anchored[0], ("left", "auto".to_string()));

        let dragged = placement_styles(Placement::At(PanelPosition::new(42.0, 99.5)));
        assert_eq!(dragged[0], ("left", "42px".to_string()));
        assert_eq!(dragged[1], ("top", "99.5px".to_string()));
        assert_eq!(dragged[3], ("bottom", "auto".to_string()));
    }

    #[test]
    fn bad_config_falls_back_to_defaults() {
        assert_eq!(config_from_global(None), OverlayConfig::default());
        assert_eq!(config_from_global(Some("not json")), OverlayConfig::default());
        assert_eq!(
            config_from_global(Some(r#"{"pollIntervalMs": 250}"#)).poll_interval_ms,
            250
        );
    }
}
