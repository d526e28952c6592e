/// Map renderer: Leaflet hotspot map with heat + clustered-marker overlays.
///
/// Produces a self-contained HTML fragment. The Leaflet, Leaflet.heat and
/// Leaflet.markercluster assets load from a CDN; everything data-dependent is
/// serialised to one JSON object that a small inline script turns into layers:
/// - Two base layers: street map and satellite imagery
/// - Heat overlay weighted by `ln(1 + index)`
/// - Marker-cluster overlay, one popup marker per sample
/// - Layer control and a `fitBounds` initial view
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use log::debug;
use serde::Serialize;

use super::aggregate::{aggregate, GeoDataset, GeoPoint};
use crate::color::{heat_gradient, SeverityColor};
use crate::data::model::{Role, MISSING_LABEL};
use crate::data::resolve::Resolution;
use crate::error::AnalysisError;

const LEAFLET_VERSION: &str = "1.9.4";
const MARKERCLUSTER_VERSION: &str = "1.5.3";
const HEAT_VERSION: &str = "0.2.0";

// ── Config ──────────────────────────────────────────────────────────────────

/// Visual tuning for the rendered map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapStyle {
    /// Heat point radius in pixels
    pub heat_radius: u32,
    /// Heat blur in pixels
    pub heat_blur: u32,
    /// Minimum heat opacity, 0..=1
    pub heat_min_opacity: f64,
    /// Zoom at which heat points reach full intensity
    pub heat_max_zoom: u32,
    /// Number of gradient stops between green and red
    pub gradient_steps: usize,
    pub marker_radius: u32,
    pub popup_max_width: u32,
    pub height_px: u32,
    /// Degrees added around a single-point bounding box
    pub single_point_pad: f64,
}

impl Default for MapStyle {
    fn default() -> Self {
        Self {
            heat_radius: 25,
            heat_blur: 15,
            heat_min_opacity: 0.4,
            heat_max_zoom: 13,
            gradient_steps: 5,
            marker_radius: 8,
            popup_max_width: 300,
            height_px: 600,
            single_point_pad: 0.01,
        }
    }
}

// ── Payload ─────────────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MapPayload {
    center: [f64; 2],
    bounds: [[f64; 2]; 2],
    heat: Vec<[f64; 3]>,
    max_weight: f64,
    gradient: serde_json::Map<String, serde_json::Value>,
    markers: Vec<MarkerPayload>,
    heat_options: HeatOptions,
    marker_radius: u32,
    popup_max_width: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HeatOptions {
    radius: u32,
    blur: u32,
    min_opacity: f64,
    max_zoom: u32,
}

#[derive(Serialize)]
struct MarkerPayload {
    lat: f64,
    lon: f64,
    color: String,
    popup: String,
}

/// Popup body for one sample. The level line only appears when the table
/// has a level column and the row has a value.
pub fn popup_html(point: &GeoPoint, has_levels: bool) -> String {
    let label = point.label.as_deref().unwrap_or(MISSING_LABEL);
    let mut html = format!(
        "<b>Location:</b> {}<br><b>HMPI:</b> {:.2}",
        escape_html(label),
        point.pollution_index
    );
    if let (true, Some(level)) = (has_levels, point.pollution_level) {
        let color = SeverityColor::for_severity(Some(level));
        html.push_str(&format!(
            "<br><b style='color:{};'>Level: {}</b>",
            color.css_name(),
            escape_html(level.label())
        ));
    }
    html
}

fn build_payload(dataset: &GeoDataset, style: &MapStyle) -> MapPayload {
    let gradient = heat_gradient(style.gradient_steps)
        .into_iter()
        .map(|(stop, hex)| (format!("{stop}"), serde_json::Value::String(hex)))
        .collect();

    let markers = dataset
        .points
        .iter()
        .map(|p| MarkerPayload {
            lat: p.latitude,
            lon: p.longitude,
            color: SeverityColor::for_severity(p.pollution_level).hex(),
            popup: popup_html(p, dataset.has_levels),
        })
        .collect();

    MapPayload {
        center: [dataset.center.0, dataset.center.1],
        bounds: dataset.bounds.to_leaflet(style.single_point_pad),
        heat: dataset
            .points
            .iter()
            .map(|p| [p.latitude, p.longitude, p.weight])
            .collect(),
        // leaflet.heat divides by `max`; keep it positive when every index is 0.
        max_weight: if dataset.max_weight > 0.0 { dataset.max_weight } else { 1.0 },
        gradient,
        markers,
        heat_options: HeatOptions {
            radius: style.heat_radius,
            blur: style.heat_blur,
            min_opacity: style.heat_min_opacity,
            max_zoom: style.heat_max_zoom,
        },
        marker_radius: style.marker_radius,
        popup_max_width: style.popup_max_width,
    }
}

// ── HTML generation ─────────────────────────────────────────────────────────

/// Render a validated dataset as an embeddable HTML fragment. Deterministic:
/// the element id is derived from the payload.
pub fn render(dataset: &GeoDataset, style: &MapStyle) -> String {
    let payload = build_payload(dataset, style);
    // serde_json cannot fail on this payload: string keys, finite numbers.
    let json = serde_json::to_string(&payload)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/");

    let mut hasher = DefaultHasher::new();
    json.hash(&mut hasher);
    let map_id = format!("jalsuchak-map-{:016x}", hasher.finish());

    debug!(
        "rendering map {map_id}: {} marker(s)",
        dataset.points.len()
    );

    format!(
        r##"<div id="{map_id}" class="jalsuchak-map" style="width:100%; height:{height}px;"></div>
<link rel="stylesheet" href="https://unpkg.com/leaflet@{leaflet}/dist/leaflet.css"/>
<link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@{cluster}/dist/MarkerCluster.css"/>
<link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@{cluster}/dist/MarkerCluster.Default.css"/>
<script src="https://unpkg.com/leaflet@{leaflet}/dist/leaflet.js"></script>
<script src="https://unpkg.com/leaflet.markercluster@{cluster}/dist/leaflet.markercluster.js"></script>
<script src="https://unpkg.com/leaflet.heat@{heat}/dist/leaflet-heat.js"></script>
<script>
(function () {{
  var data = {json};
  var street = L.tileLayer("https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png", {{
    maxZoom: 19, attribution: "&copy; OpenStreetMap contributors"
  }});
  var satellite = L.tileLayer("https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{{z}}/{{y}}/{{x}}", {{
    maxZoom: 19, attribution: "Tiles &copy; Esri"
  }});
  var map = L.map("{map_id}", {{ center: data.center, zoom: 8, layers: [street] }});

  var heatOptions = data.heatOptions;
  heatOptions.max = data.maxWeight;
  heatOptions.gradient = data.gradient;
  var heat = L.heatLayer(data.heat, heatOptions).addTo(map);

  var stations = L.markerClusterGroup();
  data.markers.forEach(function (m) {{
    L.circleMarker([m.lat, m.lon], {{
      radius: data.markerRadius, color: m.color, fillColor: m.color, fillOpacity: 0.85, weight: 1
    }}).bindPopup(m.popup, {{ maxWidth: data.popupMaxWidth }}).addTo(stations);
  }});
  stations.addTo(map);

  L.control.layers(
    {{ "Street Map": street, "Satellite": satellite }},
    {{ "HMPI Heatmap": heat, "Pollution Stations": stations }},
    {{ collapsed: false }}
  ).addTo(map);
  map.fitBounds(data.bounds, {{ padding: [20, 20] }});
}})();
</script>"##,
        height = style.height_px,
        leaflet = LEAFLET_VERSION,
        cluster = MARKERCLUSTER_VERSION,
        heat = HEAT_VERSION,
    )
}

/// Render a map for a resolved table, or a short HTML message explaining why
/// there is none.
pub fn render_or_message(resolution: &Resolution, style: &MapStyle) -> String {
    match try_render(resolution, style) {
        Ok(html) => html,
        Err(err) => err.to_html(),
    }
}

/// Like [`render_or_message`] but returns the failure for the caller.
pub fn try_render(resolution: &Resolution, style: &MapStyle) -> Result<String, AnalysisError> {
    let missing = resolution.missing(&Role::GEO_MANDATORY);
    if !missing.is_empty() {
        return Err(AnalysisError::UnresolvedSchema(missing));
    }
    let dataset = aggregate(&resolution.table).into_result()?;
    Ok(render(&dataset, style))
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, RawTable, Severity};
    use crate::data::resolve::resolve;
    use crate::map::aggregate::GeoOutcome;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn sample_resolution() -> Resolution {
        resolve(&RawTable::new(
            vec!["Station".into(), "lat".into(), "lon".into(), "HMPI".into(), "Level".into()],
            vec![
                vec![text("Well <A>"), text("12.9"), text("77.5"), text("120"), text("Poor")],
                vec![text("Well B"), text("13.0"), text("77.6"), text("45.456"), text("Good")],
            ],
        ))
    }

    fn point(level: Option<Severity>) -> GeoPoint {
        GeoPoint {
            row: 0,
            label: None,
            latitude: 1.0,
            longitude: 2.0,
            pollution_index: 7.891,
            pollution_level: level,
            weight: 0.0,
        }
    }

    #[test]
    fn popup_formats_index_and_colours_level() {
        let html = popup_html(&point(Some(Severity::VeryPoor)), true);
        assert!(html.contains("<b>Location:</b> N/A"));
        assert!(html.contains("<b>HMPI:</b> 7.89"));
        assert!(html.contains("color:darkred;"));
        assert!(html.contains("Level: Very Poor"));
    }

    #[test]
    fn popup_skips_level_without_a_level_column() {
        let html = popup_html(&point(Some(Severity::Poor)), false);
        assert!(!html.contains("Level:"));
        let html = popup_html(&point(None), true);
        assert!(!html.contains("Level:"));
    }

    #[test]
    fn map_has_layers_control_and_fit() {
        let html = render_or_message(&sample_resolution(), &MapStyle::default());
        assert!(html.contains("Street Map"));
        assert!(html.contains("Satellite"));
        assert!(html.contains("HMPI Heatmap"));
        assert!(html.contains("Pollution Stations"));
        assert!(html.contains("L.control.layers"));
        assert!(html.contains("map.fitBounds(data.bounds"));
        assert!(html.contains("L.heatLayer"));
        assert!(html.contains("L.markerClusterGroup"));
        assert_eq!(html.matches("\"popup\":").count(), 2);
    }

    #[test]
    fn labels_are_escaped_and_script_safe() {
        let html = render_or_message(&sample_resolution(), &MapStyle::default());
        assert!(html.contains("Well &lt;A&gt;"));
        assert!(!html.contains("Well <A>"));
        // Popup markup inside the JSON cannot close the script element.
        assert!(html.contains("<\\/b>"));
        assert_eq!(html.matches("</script>").count(), 4);
    }

    #[test]
    fn rendering_is_deterministic() {
        let style = MapStyle::default();
        let a = render_or_message(&sample_resolution(), &style);
        let b = render_or_message(&sample_resolution(), &style);
        assert_eq!(a, b);
    }

    #[test]
    fn heat_max_uses_log_weight() {
        let res = sample_resolution();
        let GeoOutcome::Dataset(ds) = aggregate(&res.table) else {
            panic!("expected a dataset");
        };
        let payload = build_payload(&ds, &MapStyle::default());
        assert!((payload.max_weight - 120f64.ln_1p()).abs() < 1e-12);
        assert_eq!(payload.heat.len(), 2);
        assert_eq!(payload.markers[0].color, "#ff0000");
        assert_eq!(payload.markers[1].color, "#008000");
    }

    #[test]
    fn missing_columns_give_a_message() {
        let res = resolve(&RawTable::new(
            vec!["lat".into(), "HMPI".into()],
            vec![vec![text("1"), text("2")]],
        ));
        let html = render_or_message(&res, &MapStyle::default());
        assert_eq!(
            html,
            "<p>Error: Data does not contain the required column(s): longitude</p>"
        );
    }

    #[test]
    fn invalid_rows_give_a_message() {
        let res = resolve(&RawTable::new(
            vec!["lat".into(), "lon".into(), "HMPI".into()],
            vec![vec![text("north"), text("77.5"), text("3")]],
        ));
        let html = render_or_message(&res, &MapStyle::default());
        assert!(html.starts_with("<p>Error: No valid geospatial data to display"));
    }
}
