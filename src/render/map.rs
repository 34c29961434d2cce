//! Standalone Leaflet page showing one municipality outline.

use crate::render::error::RenderError;
use crate::types::boundary::Boundary;
use crate::types::climate::LonLat;
use chrono::NaiveDateTime;
use std::path::Path;

const LEAFLET_VERSION: &str = "1.9.4";
pub const DEFAULT_ZOOM: u8 = 10;

/// What the map page shows.
pub struct MapView<'a> {
    pub title: &'a str,
    pub boundary: &'a Boundary,
    pub center: LonLat,
    pub zoom: u8,
    pub rendered_at: NaiveDateTime,
}

impl MapView<'_> {
    /// Renders the page as a self-contained HTML string.
    pub fn to_html(&self) -> Result<String, RenderError> {
        let feature = serde_json::to_string(&self.boundary.to_feature())
            .map_err(RenderError::Serialize)?
            // Keep the payload from closing the surrounding script element.
            .replace("</", "<\\/");

        Ok(format!(
            r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
<meta charset="utf-8">
<title>{title}</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@{leaflet}/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@{leaflet}/dist/leaflet.js"></script>
<style>html, body, #map {{ height: 100%; margin: 0; }}</style>
</head>
<body>
<div id="map"></div>
<script>
const map = L.map("map").setView([{lat}, {lon}], {zoom});
L.tileLayer("https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png", {{
  attribution: "&copy; OpenStreetMap contributors"
}}).addTo(map);
const municipio = {feature};
L.geoJSON(municipio, {{
  style: {{ fillColor: "red", color: "black", weight: 1, fillOpacity: 0.2 }}
}}).bindTooltip(function (layer) {{
  return "Código município: " + layer.feature.properties.codarea;
}}).addTo(map);
L.control.attribution({{ prefix: "Gerado em {rendered_at}" }}).addTo(map);
</script>
</body>
</html>
"#,
            title = html_escape(self.title),
            leaflet = LEAFLET_VERSION,
            lat = self.center.lat(),
            lon = self.center.lon(),
            zoom = self.zoom,
            feature = feature,
            rendered_at = self.rendered_at.format("%Y-%m-%d %H:%M:%S"),
        ))
    }

    pub fn write(&self, path: &Path) -> Result<(), RenderError> {
        let html = self.to_html()?;
        std::fs::write(path, html).map_err(|e| RenderError::Write(path.to_path_buf(), e))
    }
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
