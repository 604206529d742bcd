//! HTML rendering of a [`DashboardView`] and parsing of the page's query string.
use db::Observation;

use super::charts::to_plot;
use super::{CitySelection, DashboardView, Report};

const PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.12.1.min.js";
const TABLE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const STYLE: &str = "
body { font-family: sans-serif; margin: 2rem; background: #f0f8ff; color: #0d3b66; }
.metrics { display: flex; gap: 1rem; flex-wrap: wrap; }
.metric { background: #fff; border-radius: 10px; padding: 1rem; min-width: 10rem; }
.metric .value { font-size: 1.6rem; font-weight: bold; }
.charts { display: grid; grid-template-columns: repeat(auto-fit, minmax(28rem, 1fr)); gap: 1rem; }
.warning { background: #fff3cd; padding: 1rem; border-radius: 6px; }
.error { background: #f8d7da; padding: 1rem; border-radius: 6px; }
table { border-collapse: collapse; background: #fff; }
td, th { padding: 0.3rem 0.8rem; border-bottom: 1px solid #ddd; }
button { background: #f4d35e; color: #0d3b66; font-weight: bold; border: 0; border-radius: 10px; padding: 0.6rem 1.2rem; }
";

/// What the user asked for through the page's form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardQuery {
    pub selection: CitySelection,
    pub refresh: bool,
}

impl DashboardQuery {
    /// Parses `city=A&city=B&filtered=1&refresh=1`.
    ///
    /// Without `filtered` and without any `city` every city is selected;
    /// a submitted form with every box unticked selects none.
    pub fn parse(raw: &str) -> Self {
        let mut cities = Vec::new();
        let mut filtered = false;
        let mut refresh = false;

        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            match key.as_ref() {
                "city" => cities.push(value.into_owned()),
                "filtered" => filtered = true,
                "refresh" => refresh = true,
                _ => {}
            }
        }

        let selection = if cities.is_empty() && !filtered {
            CitySelection::All
        } else {
            CitySelection::Only(cities)
        };

        Self { selection, refresh }
    }
}

/// The complete dashboard document
pub fn page(view: &DashboardView) -> String {
    let mut body = String::new();
    body.push_str("<h1>🌤 Dashboard Climático</h1>\n");
    body.push_str("<p>Datos de clima por ciudad extraídos cada hora.</p>\n");

    match view {
        DashboardView::NoData { notice, warning } => {
            if let Some(warning) = warning {
                body.push_str(&format!("<div class=\"error\">{}</div>\n", escape(warning)));
            }
            body.push_str(&format!("<div class=\"warning\">{}</div>\n", escape(notice)));
        }
        DashboardView::Ready(report) => render_report(&mut body, report),
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"es\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Dashboard Climático</title>\n<style>{}</style>\n\
         <script src=\"{}\"></script>\n</head>\n<body>\n{}</body>\n</html>\n",
        STYLE, PLOTLY_JS, body
    )
}

fn render_report(body: &mut String, report: &Report) {
    body.push_str("<section class=\"metrics\">\n");
    body.push_str(&metric("Registros totales", &report.total_records.to_string()));
    for tile in report.metrics.tiles() {
        body.push_str(&metric(tile.label, &tile.value));
    }
    body.push_str("</section>\n");

    body.push_str("<h2>🌆 Selección de ciudades</h2>\n");
    body.push_str("<form method=\"get\" action=\"/\">\n<input type=\"hidden\" name=\"filtered\" value=\"1\">\n");
    for city in &report.available_cities {
        let checked = if report.selected_cities.contains(city) {
            " checked"
        } else {
            ""
        };
        body.push_str(&format!(
            "<label><input type=\"checkbox\" name=\"city\" value=\"{0}\"{1}> {0}</label>\n",
            escape(city),
            checked
        ));
    }
    body.push_str("<button type=\"submit\">Aplicar filtro</button>\n");
    body.push_str("<button type=\"submit\" name=\"refresh\" value=\"1\">Actualizar datos</button>\n");
    body.push_str("</form>\n");

    body.push_str("<section class=\"charts\">\n");
    for spec in &report.charts {
        body.push_str("<div class=\"chart\">\n");
        body.push_str(&to_plot(spec).to_inline_html(Some(spec.id)));
        body.push_str("\n</div>\n");
    }
    body.push_str("</section>\n");

    body.push_str("<h2>📋 Datos recientes</h2>\n");
    body.push_str(&table(&report.rows));
}

fn metric(label: &str, value: &str) -> String {
    format!(
        "<div class=\"metric\"><div class=\"label\">{}</div><div class=\"value\">{}</div></div>\n",
        escape(label),
        escape(value)
    )
}

fn table(rows: &[Observation]) -> String {
    let mut html = String::from(
        "<table class=\"data\">\n<tr><th>ciudad</th><th>temperatura</th><th>humedad</th>\
         <th>velocidad_viento</th><th>sensacion_termica</th><th>fecha_extraccion</th></tr>\n",
    );
    for row in rows {
        let extracted_at = row
            .extracted_at
            .map(|t| t.format(TABLE_TIME_FORMAT).to_string())
            .unwrap_or_default();
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape(&row.city),
            cell(row.temperature_c),
            cell(row.humidity_pct),
            cell(row.wind_speed_kmh),
            cell(row.feels_like_c),
            extracted_at
        ));
    }
    html.push_str("</table>\n");
    html
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
