use crate::canvas::action::{self, CanvasEffect};
use crate::canvas::contract::{self, ComponentTag};
use crate::canvas::expr;
use crate::canvas::spec::{self, CanvasSpec, ElementDef};
use crate::canvas::state::StateStore;
use crate::theme::Theme;
use eframe::egui::{self, Align2, Color32, CornerRadius, FontId, RichText};
use serde_json::Value;
use std::collections::BTreeMap;

/// Embedded documents may nest; beyond this depth they render as a
/// placeholder instead of recursing further.
const MAX_EMBED_DEPTH: usize = 3;

/// Everything one frame of canvas rendering needs. `spec` and `theme` are
/// shared for the whole frame; `store` and `emit` take the mutations.
pub struct RenderFrame<'a> {
    pub spec: &'a CanvasSpec,
    pub store: &'a mut StateStore,
    pub theme: &'a Theme,
    pub emit: &'a mut dyn FnMut(CanvasEffect),
    pub depth: usize,
}

/// Maps element type names to renderers. Lookup is data-driven over the
/// shared contract table; names that miss the map degrade to a labeled
/// placeholder so documents written against a newer catalog still render.
pub struct ComponentRegistry {
    tags: BTreeMap<&'static str, ComponentTag>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self {
            tags: contract::CONTRACTS
                .iter()
                .map(|entry| (entry.name, entry.tag))
                .collect(),
        }
    }

    pub fn supports(&self, kind: &str) -> bool {
        self.tags.contains_key(kind)
    }

    /// Renders one element and its subtree. Never panics: unknown keys and
    /// types become placeholders, `visible` gates the subtree off entirely
    /// (state underneath is retained in the store), and `on.press` on a
    /// non-interactive element wraps the subtree in a clickable region.
    pub fn render_element(&self, frame: &mut RenderFrame<'_>, key: &str, ui: &mut egui::Ui) {
        let spec = frame.spec;
        let theme = frame.theme;

        let Some(element) = spec.elements.get(key) else {
            placeholder(ui, theme, &format!("unknown element `{key}`"));
            return;
        };

        if let Some(cond) = &element.visible {
            if !eval_condition_in(frame, cond) {
                return;
            }
        }

        let Some(&tag) = self.tags.get(element.kind.as_str()) else {
            placeholder(ui, theme, &format!("unsupported component `{}`", element.kind));
            return;
        };

        let wrap_press = element.on.contains_key("press") && !contract::has_native_press(tag);
        if wrap_press {
            let response = ui
                .scope(|ui| self.render_tagged(frame, element, tag, key, ui))
                .response
                .interact(egui::Sense::click());
            if response.clicked() {
                self.dispatch_event(frame, element, "press");
            }
        } else {
            self.render_tagged(frame, element, tag, key, ui);
        }
    }

    fn render_children(&self, frame: &mut RenderFrame<'_>, element: &ElementDef, ui: &mut egui::Ui) {
        for child in &element.children {
            self.render_element(frame, child, ui);
        }
    }

    fn dispatch_event(&self, frame: &mut RenderFrame<'_>, element: &ElementDef, event: &str) {
        if let Some(binding) = element.on.get(event) {
            action::dispatch_binding(&mut *frame.store, binding, &mut *frame.emit);
        }
    }

    fn render_tagged(
        &self,
        frame: &mut RenderFrame<'_>,
        element: &ElementDef,
        tag: ComponentTag,
        key: &str,
        ui: &mut egui::Ui,
    ) {
        let theme = frame.theme;
        match tag {
            ComponentTag::Card => {
                theme.card_frame().show(ui, |ui| {
                    if let Some(title) = text_prop(frame, element, "title") {
                        ui.label(
                            RichText::new(title)
                                .color(theme.text_primary)
                                .size(15.0)
                                .strong(),
                        );
                        ui.add_space(theme.spacing_8);
                    }
                    self.render_children(frame, element, ui);
                });
            }
            ComponentTag::Row => {
                let gap = spacing_prop(frame, element);
                ui.horizontal(|ui| {
                    ui.spacing_mut().item_spacing.x = gap;
                    self.render_children(frame, element, ui);
                });
            }
            ComponentTag::Column | ComponentTag::Stack => {
                let gap = spacing_prop(frame, element);
                ui.vertical(|ui| {
                    ui.spacing_mut().item_spacing.y = gap;
                    self.render_children(frame, element, ui);
                });
            }
            ComponentTag::Grid => {
                let columns = num_prop(frame, element, "columns")
                    .filter(|n| n.is_finite() && *n >= 1.0)
                    .map(|n| n as usize)
                    .unwrap_or(2);
                let gap = spacing_prop(frame, element);
                egui::Grid::new(ui.id().with(key))
                    .num_columns(columns)
                    .spacing(egui::vec2(gap, gap))
                    .show(ui, |ui| {
                        for (index, child) in element.children.iter().enumerate() {
                            self.render_element(frame, child, ui);
                            if (index + 1) % columns == 0 {
                                ui.end_row();
                            }
                        }
                    });
            }
            ComponentTag::Flex => {
                let gap = spacing_prop(frame, element);
                ui.horizontal_wrapped(|ui| {
                    ui.spacing_mut().item_spacing = egui::vec2(gap, gap);
                    self.render_children(frame, element, ui);
                });
            }
            ComponentTag::Box => {
                let padding = padding_prop(frame, element);
                egui::Frame::new()
                    .inner_margin(egui::Margin::same(padding))
                    .show(ui, |ui| {
                        self.render_children(frame, element, ui);
                    });
            }
            ComponentTag::Container => {
                let padding = padding_prop(frame, element);
                theme.panel_frame(theme.surface_2, padding).show(ui, |ui| {
                    self.render_children(frame, element, ui);
                });
            }
            ComponentTag::Section => {
                ui.vertical(|ui| {
                    if let Some(title) = text_prop(frame, element, "title") {
                        ui.label(
                            RichText::new(title)
                                .color(theme.text_primary)
                                .size(15.0)
                                .strong(),
                        );
                    }
                    ui.separator();
                    self.render_children(frame, element, ui);
                });
            }
            ComponentTag::Text => {
                let text = text_prop(frame, element, "text").unwrap_or_default();
                let muted = bool_prop(frame, element, "muted");
                let color = if muted {
                    theme.text_muted
                } else {
                    theme.text_primary
                };
                ui.label(RichText::new(text).color(color).size(14.0));
            }
            ComponentTag::Heading => {
                let text = text_prop(frame, element, "text").unwrap_or_default();
                let level = num_prop(frame, element, "level")
                    .filter(|n| n.is_finite() && *n >= 1.0)
                    .map(|n| n as u64)
                    .unwrap_or(2);
                ui.label(
                    RichText::new(text)
                        .color(theme.text_primary)
                        .size(contract::heading_points(level))
                        .strong(),
                );
            }
            ComponentTag::Paragraph => {
                let text = text_prop(frame, element, "text").unwrap_or_default();
                ui.label(RichText::new(text).color(theme.text_primary).size(14.0));
            }
            ComponentTag::Badge => {
                let text = text_prop(frame, element, "text")
                    .or_else(|| text_prop(frame, element, "label"))
                    .unwrap_or_default();
                let tone = text_prop(frame, element, "tone").unwrap_or_default();
                let accent = tone_color(&tone);
                egui::Frame::new()
                    .fill(accent.gamma_multiply(0.2))
                    .corner_radius(CornerRadius::same(theme.radius_8))
                    .inner_margin(egui::Margin::symmetric(8, 2))
                    .show(ui, |ui| {
                        ui.label(RichText::new(text).color(accent).size(12.0));
                    });
            }
            ComponentTag::Metric => {
                let label = text_prop(frame, element, "label").unwrap_or_default();
                let value = text_prop(frame, element, "value").unwrap_or_default();
                let unit = text_prop(frame, element, "unit");
                ui.vertical(|ui| {
                    if !label.is_empty() {
                        ui.label(RichText::new(label).color(theme.text_muted).size(12.0));
                    }
                    ui.horizontal(|ui| {
                        ui.label(
                            RichText::new(value)
                                .color(theme.text_primary)
                                .size(22.0)
                                .strong(),
                        );
                        if let Some(unit) = unit {
                            ui.label(RichText::new(unit).color(theme.text_muted).size(12.0));
                        }
                    });
                });
            }
            ComponentTag::Alert => {
                let tone = text_prop(frame, element, "tone").unwrap_or_default();
                let title = text_prop(frame, element, "title");
                let message = text_prop(frame, element, "message")
                    .or_else(|| text_prop(frame, element, "text"))
                    .unwrap_or_default();
                let accent = tone_color(&tone);
                egui::Frame::new()
                    .fill(accent.gamma_multiply(0.15))
                    .stroke(egui::Stroke::new(1.0, accent))
                    .corner_radius(CornerRadius::same(theme.radius_8))
                    .inner_margin(egui::Margin::same(theme.spacing_12 as i8))
                    .show(ui, |ui| {
                        if let Some(title) = title {
                            ui.label(RichText::new(title).color(accent).size(13.0).strong());
                        }
                        if !message.is_empty() {
                            ui.label(RichText::new(message).color(theme.text_primary).size(13.0));
                        }
                    });
            }
            ComponentTag::Image => {
                // Sandboxed leaf: no fetching, the alt text and source stand in.
                let alt = text_prop(frame, element, "alt").unwrap_or_else(|| "image".to_string());
                let src = text_prop(frame, element, "src")
                    .or_else(|| text_prop(frame, element, "url"));
                theme.panel_frame(theme.surface_3, theme.spacing_12 as i8).show(ui, |ui| {
                    ui.label(RichText::new(format!("[image] {alt}")).color(theme.text_muted).size(13.0));
                    if let Some(src) = src {
                        ui.label(RichText::new(src).color(theme.text_muted).size(11.0));
                    }
                });
            }
            ComponentTag::Code => {
                let language = text_prop(frame, element, "language");
                let code = text_prop(frame, element, "code").unwrap_or_default();
                theme.card_frame().show(ui, |ui| {
                    ui.label(
                        RichText::new(language.unwrap_or_else(|| "code".to_string()))
                            .color(theme.text_muted)
                            .size(12.0),
                    );
                    ui.add_space(theme.spacing_4);
                    ui.label(
                        RichText::new(code)
                            .color(theme.text_primary)
                            .size(13.0)
                            .monospace(),
                    );
                });
            }
            ComponentTag::List => {
                let items = resolved_prop(frame, element, "items")
                    .and_then(|v| v.as_array().cloned())
                    .unwrap_or_default();
                let ordered = bool_prop(frame, element, "ordered");
                ui.vertical(|ui| {
                    for (index, item) in items.iter().enumerate() {
                        let marker = if ordered {
                            format!("{}.", index + 1)
                        } else {
                            "-".to_string()
                        };
                        ui.horizontal(|ui| {
                            ui.label(RichText::new(marker).color(theme.text_muted).size(14.0));
                            ui.label(
                                RichText::new(expr::display(item))
                                    .color(theme.text_primary)
                                    .size(14.0),
                            );
                        });
                    }
                });
            }
            ComponentTag::Divider => {
                ui.separator();
            }
            ComponentTag::Table => {
                let columns: Vec<String> = resolved_prop(frame, element, "columns")
                    .and_then(|v| v.as_array().cloned())
                    .unwrap_or_default()
                    .iter()
                    .map(expr::display)
                    .collect();
                let rows = resolved_prop(frame, element, "rows")
                    .and_then(|v| v.as_array().cloned())
                    .unwrap_or_default();
                egui::Grid::new(ui.id().with(key))
                    .striped(true)
                    .spacing(egui::vec2(theme.spacing_12, theme.spacing_4))
                    .show(ui, |ui| {
                        if !columns.is_empty() {
                            for column in &columns {
                                ui.label(
                                    RichText::new(column)
                                        .color(theme.text_muted)
                                        .size(12.0)
                                        .strong(),
                                );
                            }
                            ui.end_row();
                        }
                        for row in &rows {
                            let cells = row.as_array().cloned().unwrap_or_else(|| vec![row.clone()]);
                            for cell in &cells {
                                ui.label(
                                    RichText::new(expr::display(cell))
                                        .color(theme.text_primary)
                                        .size(13.0),
                                );
                            }
                            ui.end_row();
                        }
                    });
            }
            ComponentTag::Progress => {
                let value = num_prop(frame, element, "value").unwrap_or(0.0);
                let fraction = contract::progress_fraction(value);
                let mut bar = egui::ProgressBar::new(fraction);
                if let Some(label) = text_prop(frame, element, "label") {
                    bar = bar.text(label);
                }
                ui.add(bar);
            }
            ComponentTag::Button => {
                let label = text_prop(frame, element, "label")
                    .or_else(|| text_prop(frame, element, "text"))
                    .unwrap_or_else(|| "Button".to_string());
                let primary = text_prop(frame, element, "variant").as_deref() == Some("primary");
                let (fill, stroke, text_color) = if primary {
                    (theme.accent_primary, egui::Stroke::NONE, theme.text_on_accent)
                } else {
                    (
                        theme.surface_2,
                        egui::Stroke::new(1.0, theme.border_subtle),
                        theme.text_primary,
                    )
                };
                let widget = egui::Button::new(RichText::new(label).color(text_color).size(13.0))
                    .fill(fill)
                    .stroke(stroke)
                    .corner_radius(CornerRadius::same(theme.radius_8))
                    .min_size(egui::vec2(0.0, theme.button_height));
                if ui.add(widget).clicked() {
                    self.dispatch_event(frame, element, "press");
                }
            }
            ComponentTag::Input => {
                let label = text_prop(frame, element, "label").unwrap_or_default();
                let explicit = text_prop(frame, element, "path");
                let path = contract::binding_path(explicit.as_deref(), &label);
                if !label.is_empty() {
                    ui.label(RichText::new(&label).color(theme.text_muted).size(12.0));
                }
                let mut value = frame
                    .store
                    .get(&path)
                    .map(|v| expr::display(&v))
                    .unwrap_or_default();
                let hint = text_prop(frame, element, "placeholder").unwrap_or_default();
                let response = ui.add(
                    egui::TextEdit::singleline(&mut value)
                        .desired_width(f32::INFINITY)
                        .hint_text(hint),
                );
                if response.changed() {
                    frame.store.set(&path, Value::String(value));
                    self.dispatch_event(frame, element, "change");
                }
            }
            ComponentTag::Select => {
                let label = text_prop(frame, element, "label").unwrap_or_default();
                let explicit = text_prop(frame, element, "path");
                let path = contract::binding_path(explicit.as_deref(), &label);
                let options: Vec<String> = resolved_prop(frame, element, "options")
                    .and_then(|v| v.as_array().cloned())
                    .unwrap_or_default()
                    .iter()
                    .map(expr::display)
                    .collect();
                if !label.is_empty() {
                    ui.label(RichText::new(&label).color(theme.text_muted).size(12.0));
                }
                let current = frame
                    .store
                    .get(&path)
                    .map(|v| expr::display(&v))
                    .unwrap_or_default();
                egui::ComboBox::from_id_salt(ui.id().with(key))
                    .selected_text(current.clone())
                    .show_ui(ui, |ui| {
                        for option in &options {
                            if ui.selectable_label(current == *option, option).clicked() {
                                frame.store.set(&path, Value::String(option.clone()));
                                self.dispatch_event(frame, element, "change");
                            }
                        }
                    });
            }
            ComponentTag::Checkbox => {
                let label = text_prop(frame, element, "label").unwrap_or_default();
                let explicit = text_prop(frame, element, "path");
                let path = contract::binding_path(explicit.as_deref(), &label);
                let mut checked = frame
                    .store
                    .get(&path)
                    .map(|v| expr::truthy(&v))
                    .unwrap_or(false);
                let widget_label = RichText::new(label).color(theme.text_primary).size(13.0);
                if ui.checkbox(&mut checked, widget_label).changed() {
                    frame.store.set(&path, Value::Bool(checked));
                    self.dispatch_event(frame, element, "change");
                }
            }
            ComponentTag::Link => {
                let url = text_prop(frame, element, "url")
                    .or_else(|| text_prop(frame, element, "href"));
                let text = text_prop(frame, element, "text")
                    .or_else(|| text_prop(frame, element, "label"))
                    .or_else(|| url.clone())
                    .unwrap_or_default();
                if element.on.contains_key("press") {
                    if ui.link(text).clicked() {
                        self.dispatch_event(frame, element, "press");
                    }
                } else if let Some(url) = url {
                    ui.hyperlink_to(text, url);
                } else {
                    ui.label(RichText::new(text).color(theme.accent_primary).size(14.0));
                }
            }
            ComponentTag::Map => {
                self.render_map(frame, element, key, ui);
            }
            ComponentTag::Chart => {
                self.render_chart(frame, element, ui);
            }
            ComponentTag::Diagram => {
                self.render_diagram(frame, element, ui);
            }
            ComponentTag::HtmlView => {
                let html = text_prop(frame, element, "html")
                    .or_else(|| text_prop(frame, element, "content"))
                    .unwrap_or_default();
                let text = contract::strip_tags(&html);
                theme.panel_frame(theme.surface_3, theme.spacing_12 as i8).show(ui, |ui| {
                    if text.is_empty() {
                        ui.label(RichText::new("(empty)").color(theme.text_muted).size(12.0));
                    } else {
                        ui.label(RichText::new(text).color(theme.text_primary).size(13.0));
                    }
                });
            }
            ComponentTag::Embed => {
                self.render_embed(frame, element, ui);
            }
        }
    }

    fn render_map(
        &self,
        frame: &mut RenderFrame<'_>,
        element: &ElementDef,
        key: &str,
        ui: &mut egui::Ui,
    ) {
        let theme = frame.theme;
        let markers = resolved_prop(frame, element, "markers")
            .and_then(|v| v.as_array().cloned())
            .unwrap_or_default();

        let size = egui::vec2(ui.available_width().max(120.0), 160.0);
        let (rect, response) = ui.allocate_exact_size(size, egui::Sense::drag());
        let id = ui.id().with(key).with("pan");
        let mut offset: egui::Vec2 = ui.data_mut(|d| d.get_temp(id).unwrap_or(egui::Vec2::ZERO));
        if response.dragged() {
            offset += response.drag_delta();
            ui.data_mut(|d| d.insert_temp(id, offset));
        }

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, CornerRadius::same(theme.radius_8), theme.surface_3);
        for marker in &markers {
            let x = expr::to_number(marker.get("x").unwrap_or(&Value::Null));
            let y = expr::to_number(marker.get("y").unwrap_or(&Value::Null));
            if !x.is_finite() || !y.is_finite() {
                continue;
            }
            let pos = rect.left_top()
                + egui::vec2(
                    x.clamp(0.0, 1.0) as f32 * rect.width(),
                    y.clamp(0.0, 1.0) as f32 * rect.height(),
                )
                + offset;
            if !rect.contains(pos) {
                continue;
            }
            painter.circle_filled(pos, 4.0, theme.accent_primary);
            if let Some(label) = marker.get("label").and_then(Value::as_str) {
                painter.text(
                    pos + egui::vec2(7.0, 0.0),
                    Align2::LEFT_CENTER,
                    label,
                    FontId::proportional(11.0),
                    theme.text_primary,
                );
            }
        }
    }

    fn render_chart(&self, frame: &mut RenderFrame<'_>, element: &ElementDef, ui: &mut egui::Ui) {
        let theme = frame.theme;
        let raw = resolved_prop(frame, element, "points").unwrap_or(Value::Null);
        let points = contract::numeric_points(&raw);
        let levels = contract::chart_levels(&points);
        let line = text_prop(frame, element, "kind").as_deref() == Some("line");

        let size = egui::vec2(ui.available_width().max(120.0), 120.0);
        let (rect, _response) = ui.allocate_exact_size(size, egui::Sense::hover());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, CornerRadius::same(theme.radius_8), theme.surface_3);

        if levels.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "no data",
                FontId::proportional(12.0),
                theme.text_muted,
            );
            return;
        }

        let inner = rect.shrink(8.0);
        let step = inner.width() / levels.len() as f32;
        if line {
            let mut previous: Option<egui::Pos2> = None;
            for (index, level) in levels.iter().enumerate() {
                let pos = egui::pos2(
                    inner.left() + step * (index as f32 + 0.5),
                    inner.bottom() - level * inner.height(),
                );
                if let Some(prev) = previous {
                    painter.line_segment([prev, pos], egui::Stroke::new(2.0, theme.accent_primary));
                }
                painter.circle_filled(pos, 2.5, theme.accent_primary);
                previous = Some(pos);
            }
        } else {
            for (index, level) in levels.iter().enumerate() {
                let left = inner.left() + step * index as f32 + step * 0.15;
                let bar = egui::Rect::from_min_max(
                    egui::pos2(left, inner.bottom() - level * inner.height()),
                    egui::pos2(left + step * 0.7, inner.bottom()),
                );
                painter.rect_filled(bar, CornerRadius::same(2), theme.accent_primary);
            }
        }
    }

    fn render_diagram(&self, frame: &mut RenderFrame<'_>, element: &ElementDef, ui: &mut egui::Ui) {
        let theme = frame.theme;
        let source = text_prop(frame, element, "source")
            .or_else(|| text_prop(frame, element, "text"))
            .unwrap_or_default();

        // Leaf error boundary: a bad diagram renders its own error message
        // and nothing outside this element is affected.
        let edges = match contract::parse_diagram(&source) {
            Ok(edges) => edges,
            Err(message) => {
                theme.panel_frame(theme.surface_3, theme.spacing_12 as i8).show(ui, |ui| {
                    ui.label(
                        RichText::new(format!("diagram error: {message}"))
                            .color(theme.danger)
                            .size(12.0),
                    );
                });
                return;
            }
        };

        let nodes = contract::diagram_nodes(&edges);
        if nodes.is_empty() {
            placeholder(ui, theme, "empty diagram");
            return;
        }

        let row_height = 40.0;
        let size = egui::vec2(
            ui.available_width().max(120.0),
            row_height * nodes.len() as f32 + 16.0,
        );
        let (rect, _response) = ui.allocate_exact_size(size, egui::Sense::hover());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, CornerRadius::same(theme.radius_8), theme.surface_3);

        let box_width = (rect.width() * 0.5).min(220.0);
        let center_x = rect.center().x;
        let node_rect = |index: usize| {
            let top = rect.top() + 8.0 + row_height * index as f32;
            egui::Rect::from_min_size(
                egui::pos2(center_x - box_width / 2.0, top),
                egui::vec2(box_width, row_height - 12.0),
            )
        };

        for (from, to) in &edges {
            let from_index = nodes.iter().position(|n| n == from).unwrap_or(0);
            let to_index = nodes.iter().position(|n| n == to).unwrap_or(0);
            let a = node_rect(from_index).center_bottom();
            let b = node_rect(to_index).center_top();
            painter.line_segment([a, b], egui::Stroke::new(1.5, theme.accent_muted));
            painter.circle_filled(b, 3.0, theme.accent_muted);
        }

        for (index, node) in nodes.iter().enumerate() {
            let rect = node_rect(index);
            painter.rect_filled(rect, CornerRadius::same(theme.radius_8), theme.surface_2);
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                node,
                FontId::proportional(13.0),
                theme.text_primary,
            );
        }
    }

    fn render_embed(&self, frame: &mut RenderFrame<'_>, element: &ElementDef, ui: &mut egui::Ui) {
        let theme = frame.theme;
        if frame.depth >= MAX_EMBED_DEPTH {
            placeholder(ui, theme, "embedded document nested too deep");
            return;
        }
        let Some(doc) = resolved_prop(frame, element, "spec") else {
            placeholder(ui, theme, "embed without a document");
            return;
        };
        let Some(embedded) = spec::normalize(&doc) else {
            placeholder(ui, theme, "unrenderable embedded document");
            return;
        };

        // Sandboxed static preview: fresh store every frame, effects are
        // swallowed, so interaction inside the embed does not persist and
        // cannot escape.
        let mut sub_store = StateStore::new(embedded.state.clone());
        let mut swallow = |_effect: CanvasEffect| {};
        let mut sub_frame = RenderFrame {
            spec: &embedded,
            store: &mut sub_store,
            theme,
            emit: &mut swallow,
            depth: frame.depth + 1,
        };
        let root = embedded.root.clone();
        theme.panel_frame(theme.surface_1, theme.spacing_12 as i8).show(ui, |ui| {
            self.render_element(&mut sub_frame, &root, ui);
        });
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn placeholder(ui: &mut egui::Ui, theme: &Theme, message: &str) {
    theme.panel_frame(theme.surface_3, 8).show(ui, |ui| {
        ui.label(RichText::new(message).color(theme.warning).size(12.0));
    });
}

fn eval_condition_in(frame: &RenderFrame<'_>, cond: &Value) -> bool {
    let store: &StateStore = &*frame.store;
    expr::eval_condition(cond, &|path| store.get(path))
}

fn resolved_prop(frame: &RenderFrame<'_>, element: &ElementDef, name: &str) -> Option<Value> {
    let raw = element.props.get(name)?;
    let store: &StateStore = &*frame.store;
    Some(expr::resolve(raw, &|path| store.get(path)))
}

fn text_prop(frame: &RenderFrame<'_>, element: &ElementDef, name: &str) -> Option<String> {
    resolved_prop(frame, element, name).map(|value| expr::display(&value))
}

fn num_prop(frame: &RenderFrame<'_>, element: &ElementDef, name: &str) -> Option<f64> {
    resolved_prop(frame, element, name).map(|value| expr::to_number(&value))
}

fn bool_prop(frame: &RenderFrame<'_>, element: &ElementDef, name: &str) -> bool {
    resolved_prop(frame, element, name)
        .map(|value| expr::truthy(&value))
        .unwrap_or(false)
}

fn spacing_prop(frame: &RenderFrame<'_>, element: &ElementDef) -> f32 {
    contract::spacing_points(text_prop(frame, element, "spacing").as_deref().unwrap_or("md"))
}

fn padding_prop(frame: &RenderFrame<'_>, element: &ElementDef) -> i8 {
    contract::padding_points(text_prop(frame, element, "padding").as_deref().unwrap_or("md"))
}

fn tone_color(tone: &str) -> Color32 {
    let (r, g, b) = contract::tone_rgb(tone);
    Color32::from_rgb(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_the_whole_contract_table() {
        let registry = ComponentRegistry::new();
        for entry in contract::CONTRACTS {
            assert!(registry.supports(entry.name), "missing {}", entry.name);
        }
        assert!(!registry.supports("Nonexistent"));
        assert!(!registry.supports("button"));
    }
}
