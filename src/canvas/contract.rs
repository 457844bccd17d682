//! The per-type contract shared by the live renderer and the code emitter.
//!
//! Every mapping that could drift between the two targets lives here once:
//! the type catalog itself, spacing and padding scales, heading sizes, tone
//! palettes, label-derived state paths, and the helpers leaf integrations
//! use to digest their props. The renderer interprets these values each
//! frame; the emitter bakes them into generated source. Keeping them in one
//! table is what makes the two targets agree.

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentTag {
    // Layout containers.
    Card,
    Row,
    Column,
    Stack,
    Grid,
    Flex,
    Box,
    Container,
    Section,
    // Content leaves.
    Text,
    Heading,
    Paragraph,
    Badge,
    Metric,
    Alert,
    Image,
    Code,
    List,
    Divider,
    Table,
    Progress,
    // Interactive.
    Button,
    Input,
    Select,
    Checkbox,
    Link,
    // Self-contained visual leaves.
    Map,
    Chart,
    Diagram,
    HtmlView,
    Embed,
}

pub struct ComponentContract {
    pub name: &'static str,
    pub tag: ComponentTag,
}

pub const CONTRACTS: &[ComponentContract] = &[
    ComponentContract { name: "Card", tag: ComponentTag::Card },
    ComponentContract { name: "Row", tag: ComponentTag::Row },
    ComponentContract { name: "Column", tag: ComponentTag::Column },
    ComponentContract { name: "Stack", tag: ComponentTag::Stack },
    ComponentContract { name: "Grid", tag: ComponentTag::Grid },
    ComponentContract { name: "Flex", tag: ComponentTag::Flex },
    ComponentContract { name: "Box", tag: ComponentTag::Box },
    ComponentContract { name: "Container", tag: ComponentTag::Container },
    ComponentContract { name: "Section", tag: ComponentTag::Section },
    ComponentContract { name: "Text", tag: ComponentTag::Text },
    ComponentContract { name: "Heading", tag: ComponentTag::Heading },
    ComponentContract { name: "Paragraph", tag: ComponentTag::Paragraph },
    ComponentContract { name: "Badge", tag: ComponentTag::Badge },
    ComponentContract { name: "Metric", tag: ComponentTag::Metric },
    ComponentContract { name: "Alert", tag: ComponentTag::Alert },
    ComponentContract { name: "Image", tag: ComponentTag::Image },
    ComponentContract { name: "Code", tag: ComponentTag::Code },
    ComponentContract { name: "List", tag: ComponentTag::List },
    ComponentContract { name: "Divider", tag: ComponentTag::Divider },
    ComponentContract { name: "Table", tag: ComponentTag::Table },
    ComponentContract { name: "Progress", tag: ComponentTag::Progress },
    ComponentContract { name: "Button", tag: ComponentTag::Button },
    ComponentContract { name: "Input", tag: ComponentTag::Input },
    ComponentContract { name: "Select", tag: ComponentTag::Select },
    ComponentContract { name: "Checkbox", tag: ComponentTag::Checkbox },
    ComponentContract { name: "Link", tag: ComponentTag::Link },
    ComponentContract { name: "Map", tag: ComponentTag::Map },
    ComponentContract { name: "Chart", tag: ComponentTag::Chart },
    ComponentContract { name: "Diagram", tag: ComponentTag::Diagram },
    ComponentContract { name: "HtmlView", tag: ComponentTag::HtmlView },
    ComponentContract { name: "Embed", tag: ComponentTag::Embed },
];

pub fn lookup(name: &str) -> Option<&'static ComponentContract> {
    CONTRACTS.iter().find(|contract| contract.name == name)
}

/// True for types that consume their own `on.press` binding; everything else
/// gets the generic clickable wrapper.
pub fn has_native_press(tag: ComponentTag) -> bool {
    matches!(
        tag,
        ComponentTag::Button
            | ComponentTag::Input
            | ComponentTag::Select
            | ComponentTag::Checkbox
            | ComponentTag::Link
    )
}

/// Gap between the children of a layout container, from the `spacing` prop.
pub fn spacing_points(value: &str) -> f32 {
    match value {
        "none" => 0.0,
        "xs" => 2.0,
        "sm" => 4.0,
        "lg" => 16.0,
        "xl" => 24.0,
        // "md" and anything unrecognized.
        _ => 8.0,
    }
}

/// Inner margin of a container, from the `padding` prop.
pub fn padding_points(value: &str) -> i8 {
    match value {
        "none" => 0,
        "sm" => 8,
        "lg" => 16,
        "xl" => 24,
        _ => 12,
    }
}

/// Font size for `Heading` levels 1..=6.
pub fn heading_points(level: u64) -> f32 {
    match level {
        1 => 22.0,
        2 => 19.0,
        3 => 17.0,
        4..=6 => 15.0,
        _ => 19.0,
    }
}

/// Accent color for Badge/Alert tones. "error" and "danger" are synonyms;
/// unknown tones fall back to the info blue.
pub fn tone_rgb(tone: &str) -> (u8, u8, u8) {
    match tone {
        "success" => (46, 164, 106),
        "warning" => (217, 153, 28),
        "error" | "danger" => (222, 79, 79),
        _ => (74, 136, 218),
    }
}

/// Collapses a human label into a state-path segment: lowercased, runs of
/// non-alphanumerics become a single underscore.
pub fn slug(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut gap = false;
    for ch in label.chars() {
        if ch.is_alphanumeric() {
            if gap && !out.is_empty() {
                out.push('_');
            }
            gap = false;
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
        } else {
            gap = true;
        }
    }
    out
}

/// The state path an Input/Select/Checkbox binds to when the document gives a
/// `path` prop, falling back to a path derived from the label.
pub fn binding_path(explicit: Option<&str>, label: &str) -> String {
    match explicit {
        Some(path) if !path.is_empty() => path.to_string(),
        _ => {
            let slugged = slug(label);
            if slugged.is_empty() {
                "/form/field".to_string()
            } else {
                format!("/form/{slugged}")
            }
        }
    }
}

/// Progress `value` prop is 0..=100; out-of-range and non-numeric values
/// clamp instead of erroring.
pub fn progress_fraction(value: f64) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    (value / 100.0).clamp(0.0, 1.0) as f32
}

/// Normalizes chart points to 0..=1 levels against the largest magnitude.
/// All-zero and empty inputs produce all-zero levels.
pub fn chart_levels(points: &[f64]) -> Vec<f32> {
    let max = points
        .iter()
        .filter(|p| p.is_finite())
        .fold(0.0f64, |acc, p| acc.max(p.abs()));
    points
        .iter()
        .map(|p| {
            if max == 0.0 || !p.is_finite() {
                0.0
            } else {
                (p.abs() / max) as f32
            }
        })
        .collect()
}

/// Reduces markup to renderable text: tags dropped, a handful of entities
/// decoded, whitespace collapsed. Good enough for the sandboxed HtmlView
/// leaf, which promises readable text rather than layout fidelity.
pub fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    let decoded = text
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses Diagram source into `A -> B` edges, one per line or
/// semicolon-separated. `-->` is accepted as well; `graph ...` header lines
/// are ignored.
pub fn parse_diagram(source: &str) -> Result<Vec<(String, String)>, String> {
    let mut edges = Vec::new();
    for raw_line in source.split(['\n', ';']) {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with("graph") {
            continue;
        }
        let (from, to) = line
            .split_once("-->")
            .or_else(|| line.split_once("->"))
            .ok_or_else(|| format!("unparseable edge `{line}`"))?;
        let from = from.trim();
        let to = to.trim();
        if from.is_empty() || to.is_empty() {
            return Err(format!("unparseable edge `{line}`"));
        }
        edges.push((from.to_string(), to.to_string()));
    }
    Ok(edges)
}

/// Unique node names of a diagram edge list, in first-appearance order.
pub fn diagram_nodes(edges: &[(String, String)]) -> Vec<String> {
    let mut nodes: Vec<String> = Vec::new();
    for (from, to) in edges {
        if !nodes.contains(from) {
            nodes.push(from.clone());
        }
        if !nodes.contains(to) {
            nodes.push(to.clone());
        }
    }
    nodes
}

/// Digests a `points` prop (numbers, numeric strings, or `{value}` objects)
/// into plain numbers for Chart.
pub fn numeric_points(raw: &Value) -> Vec<f64> {
    let Some(items) = raw.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .map(|item| {
            let scalar = item.get("value").unwrap_or(item);
            crate::canvas::expr::to_number(scalar)
        })
        .collect()
}
