//! Standalone source emission.
//!
//! `emit_source` turns a canvas document into the text of a self-contained
//! eframe program that shows the same surface. Documents with no state, no
//! event bindings, and no dynamic props emit a plain static program; anything
//! live emits a stateful program that carries the document's initial state
//! and behavior-equivalent copies of the resolution and dispatch helpers.
//! Styling numbers come from the same contract table the live renderer
//! reads, which is what keeps the two targets in agreement.

use crate::canvas::contract::{self, ComponentTag};
use crate::canvas::expr;
use crate::canvas::spec::{self, CanvasSpec, ElementDef};
use serde_json::Value;
use std::collections::BTreeMap;

const TEXT_PRIMARY: (u8, u8, u8) = (230, 237, 243);
const TEXT_MUTED: (u8, u8, u8) = (139, 148, 158);
const TEXT_ON_ACCENT: (u8, u8, u8) = (248, 251, 255);
const SURFACE_2: (u8, u8, u8) = (28, 34, 43);
const SURFACE_3: (u8, u8, u8) = (34, 42, 53);
const ACCENT: (u8, u8, u8) = (59, 130, 246);

/// Emits a complete Rust source file rendering `document`. Total: documents
/// that do not normalize emit a viewer for their raw JSON instead.
pub fn emit_source(document: &Value, name: &str) -> String {
    let app_name = sanitize_name(name);
    let Some(normalized) = spec::normalize(document) else {
        return emit_raw_viewer(document, &app_name);
    };

    let stateful = needs_state(&normalized);
    let mut emitter = Emitter::new(&normalized, &app_name, stateful);
    emitter.program();
    emitter.out
}

/// True when the emitted program must carry runtime state: declared initial
/// state beyond the empty default, any event binding or `visible` condition,
/// any dynamic prop, or any state-bound control.
pub fn needs_state(spec: &CanvasSpec) -> bool {
    if !state_is_empty(&spec.state) {
        return true;
    }
    spec.elements.values().any(|element| {
        !element.on.is_empty()
            || element.visible.is_some()
            || matches!(element.kind.as_str(), "Input" | "Select" | "Checkbox")
            || element.props.values().any(expr::is_dynamic)
    })
}

fn state_is_empty(state: &Value) -> bool {
    match state {
        Value::Null => true,
        Value::Object(map) => map.values().all(state_is_empty),
        _ => false,
    }
}

/// CamelCase identifier from an arbitrary display name.
fn sanitize_name(name: &str) -> String {
    let mut out = String::new();
    let mut boundary = true;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if boundary && ch.is_ascii_alphabetic() {
                out.push(ch.to_ascii_uppercase());
            } else {
                out.push(ch);
            }
            boundary = false;
        } else {
            boundary = true;
        }
    }
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        format!("Canvas{out}")
    } else {
        out
    }
}

/// Escapes text for inclusion in a double-quoted Rust string literal.
fn escape_str(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{{{:x}}}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// Wraps text in a raw string literal with enough `#`s that no interior
/// `"##...` sequence can terminate it early.
fn raw_literal(text: &str) -> String {
    let mut max_run = 0;
    let mut run = 0;
    for ch in text.chars() {
        if ch == '#' {
            run += 1;
            max_run = max_run.max(run);
        } else {
            run = 0;
        }
    }
    let hashes = "#".repeat(max_run + 1);
    format!("r{hashes}\"{text}\"{hashes}")
}

fn rgb(color: (u8, u8, u8)) -> String {
    format!(
        "egui::Color32::from_rgb({}, {}, {})",
        color.0, color.1, color.2
    )
}

struct Emitter<'a> {
    spec: &'a CanvasSpec,
    app_name: String,
    stateful: bool,
    fn_names: BTreeMap<String, String>,
    out: String,
    indent: usize,
}

impl<'a> Emitter<'a> {
    fn new(spec: &'a CanvasSpec, app_name: &str, stateful: bool) -> Self {
        let mut fn_names = BTreeMap::new();
        for key in spec.elements.keys() {
            let mut base = format!("el_{}", ident(key));
            if fn_names.values().any(|existing| existing == &base) {
                base = format!("{base}_{}", fn_names.len());
            }
            fn_names.insert(key.clone(), base);
        }
        Self {
            spec,
            app_name: app_name.to_string(),
            stateful,
            fn_names,
            out: String::new(),
            indent: 0,
        }
    }

    fn line(&mut self, text: &str) {
        if !text.is_empty() {
            for _ in 0..self.indent {
                self.out.push_str("    ");
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    fn open(&mut self, text: &str) {
        self.line(text);
        self.indent += 1;
    }

    fn close(&mut self, text: &str) {
        self.indent -= 1;
        self.line(text);
    }

    fn program(&mut self) {
        let name = self.app_name.clone();
        self.line(&format!("// {name}: generated canvas snapshot."));
        if self.stateful {
            self.line("// Build with: eframe = \"0.31\", serde_json = \"1\"");
        } else {
            self.line("// Build with: eframe = \"0.31\"");
        }
        self.line("");
        // Stateful programs get `use serde_json::Value;` from the helper
        // block appended at the end of the file.
        self.line("use eframe::egui;");
        self.line("");
        self.open("fn main() -> eframe::Result {");
        self.line("let options = eframe::NativeOptions::default();");
        self.open("eframe::run_native(");
        self.line(&format!("\"{name}\","));
        self.line("options,");
        self.line(&format!(
            "Box::new(|_cc| Ok(Box::new({name}::default()))),"
        ));
        self.close(")");
        self.close("}");
        self.line("");

        if self.stateful {
            self.open(&format!("struct {name} {{"));
            self.line("state: Value,");
            self.close("}");
            self.line("");
            self.open(&format!("impl Default for {name} {{"));
            self.open("fn default() -> Self {");
            let initial = raw_literal(&self.spec.state.to_string());
            self.line(&format!("Self {{ state: parse_json({initial}) }}"));
            self.close("}");
            self.close("}");
        } else {
            self.line("#[derive(Default)]");
            self.line(&format!("struct {name};"));
        }
        self.line("");

        self.open(&format!("impl eframe::App for {name} {{"));
        self.open("fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {");
        self.open("egui::CentralPanel::default().show(ctx, |ui| {");
        self.open("egui::ScrollArea::vertical().show(ui, |ui| {");
        let root = self.spec.root.clone();
        self.call_or_placeholder(&root);
        self.close("});");
        self.close("});");
        self.close("}");
        self.close("}");
        self.line("");

        self.open(&format!("impl {name} {{"));
        if self.stateful {
            self.open("fn dispatch_binding(&mut self, raw: &str) {");
            self.line("let binding = parse_json(raw);");
            self.line(
                "let action = binding.get(\"action\").and_then(Value::as_str).unwrap_or(\"\");",
            );
            self.line(
                "let params = binding.get(\"actionParams\").cloned().unwrap_or(Value::Null);",
            );
            self.line("dispatch(&mut self.state, action, &params);");
            self.close("}");
            self.line("");
        }
        let keys: Vec<String> = self.spec.elements.keys().cloned().collect();
        for (index, key) in keys.iter().enumerate() {
            self.element_fn(key);
            if index + 1 < keys.len() {
                self.line("");
            }
        }
        self.close("}");
        self.line("");

        self.style_helpers();
        if self.stateful {
            self.line("");
            self.out.push_str(RUNTIME_HELPERS);
        }
    }

    /// Emits a call to an element's render fn, or the same placeholder the
    /// live canvas shows when the key is dangling.
    fn call_or_placeholder(&mut self, key: &str) {
        match self.fn_names.get(key).cloned() {
            Some(fn_name) => self.line(&format!("self.{fn_name}(ui);")),
            None => {
                self.line(&format!("// unknown element `{key}`"));
                self.placeholder(&format!("unknown element `{key}`"));
            }
        }
    }

    fn element_fn(&mut self, key: &str) {
        let fn_name = self.fn_names.get(key).cloned().unwrap_or_default();
        let receiver = if self.stateful { "&mut self" } else { "&self" };
        let Some(element) = self.spec.elements.get(key).cloned() else {
            return;
        };

        self.open(&format!("fn {fn_name}({receiver}, ui: &mut egui::Ui) {{"));
        if let Some(cond) = &element.visible {
            let raw = raw_literal(&cond.to_string());
            self.open(&format!(
                "if !eval_condition(&parse_json({raw}), &self.state) {{"
            ));
            self.line("return;");
            self.close("}");
        }

        match contract::lookup(&element.kind).map(|entry| entry.tag) {
            Some(tag) => {
                let wrap_press =
                    element.on.contains_key("press") && !contract::has_native_press(tag);
                if wrap_press {
                    self.open("let response = ui");
                    self.open(".scope(|ui| {");
                    self.element_body(key, &element, tag);
                    self.close("})");
                    self.line(".response");
                    self.line(".interact(egui::Sense::click());");
                    self.indent -= 1;
                    self.open("if response.clicked() {");
                    self.dispatch_call(&element, "press");
                    self.close("}");
                } else {
                    self.element_body(key, &element, tag);
                }
            }
            None => {
                self.line(&format!("// unsupported component `{}`", element.kind));
                self.placeholder(&format!("unsupported component `{}`", element.kind));
            }
        }
        self.close("}");
    }

    fn dispatch_call(&mut self, element: &ElementDef, event: &str) {
        if let Some(binding) = element.on.get(event) {
            let json = serde_json::to_string(binding).unwrap_or_default();
            let raw = raw_literal(&json);
            self.line(&format!("self.dispatch_binding({raw});"));
        }
    }

    fn placeholder(&mut self, message: &str) {
        let fill = rgb(SURFACE_3);
        let muted = rgb(TEXT_MUTED);
        self.open(&format!("panel_frame({fill}, 8).show(ui, |ui| {{"));
        self.line(&format!(
            "ui.label(egui::RichText::new(\"{}\").color({muted}).size(12.0));",
            escape_str(message)
        ));
        self.close("});");
    }

    fn children(&mut self, element: &ElementDef) {
        for child in element.children.clone() {
            self.call_or_placeholder(&child);
        }
    }

    /// Rust expression producing a `String` for a text-ish prop.
    fn string_expr(&self, value: &Value) -> String {
        if let Some(path) = value.get("$path").and_then(Value::as_str) {
            return format!(
                "display(&get_path(&self.state, \"{}\"))",
                escape_str(path)
            );
        }
        if let Some(template) = value.get("$template").and_then(Value::as_str) {
            return format!(
                "render_template(\"{}\", &self.state)",
                escape_str(template)
            );
        }
        if expr::is_dynamic(value) {
            let raw = raw_literal(&value.to_string());
            return format!("display(&resolve_value(&parse_json({raw}), &self.state))");
        }
        format!("\"{}\"", escape_str(&expr::display(value)))
    }

    /// Rust expression producing a `Value` for a structured prop.
    fn value_expr(&self, value: &Value) -> String {
        let raw = raw_literal(&value.to_string());
        if expr::is_dynamic(value) {
            format!("resolve_value(&parse_json({raw}), &self.state)")
        } else {
            format!("parse_json({raw})")
        }
    }

    fn text_expr(&self, element: &ElementDef, names: &[&str]) -> Option<String> {
        names
            .iter()
            .find_map(|name| element.props.get(*name))
            .map(|value| self.string_expr(value))
    }

    /// Literal text of a prop, for values baked at emission time. Dynamic
    /// props yield their default here; style props stay literal in practice.
    fn literal_text(&self, element: &ElementDef, name: &str) -> Option<String> {
        let value = element.props.get(name)?;
        if expr::is_dynamic(value) {
            return None;
        }
        Some(expr::display(value))
    }

    fn literal_number(&self, element: &ElementDef, name: &str) -> Option<f64> {
        let value = element.props.get(name)?;
        if expr::is_dynamic(value) {
            return None;
        }
        let number = expr::to_number(value);
        number.is_finite().then_some(number)
    }

    fn spacing(&self, element: &ElementDef) -> f32 {
        contract::spacing_points(self.literal_text(element, "spacing").as_deref().unwrap_or("md"))
    }

    fn padding(&self, element: &ElementDef) -> i8 {
        contract::padding_points(self.literal_text(element, "padding").as_deref().unwrap_or("md"))
    }

    fn label_line(&mut self, expr_text: &str, color: (u8, u8, u8), size: f32, strong: bool) {
        let color = rgb(color);
        let strong = if strong { ".strong()" } else { "" };
        self.line(&format!(
            "ui.label(egui::RichText::new({expr_text}).color({color}).size({size:.1}){strong});"
        ));
    }

    fn element_body(&mut self, key: &str, element: &ElementDef, tag: ComponentTag) {
        match tag {
            ComponentTag::Card => {
                self.open("card_frame().show(ui, |ui| {");
                if let Some(title) = self.text_expr(element, &["title"]) {
                    self.label_line(&title, TEXT_PRIMARY, 15.0, true);
                    self.line("ui.add_space(8.0);");
                }
                self.children(element);
                self.close("});");
            }
            ComponentTag::Row => {
                let gap = self.spacing(element);
                self.open("ui.horizontal(|ui| {");
                self.line(&format!("ui.spacing_mut().item_spacing.x = {gap:.1};"));
                self.children(element);
                self.close("});");
            }
            ComponentTag::Column | ComponentTag::Stack => {
                let gap = self.spacing(element);
                self.open("ui.vertical(|ui| {");
                self.line(&format!("ui.spacing_mut().item_spacing.y = {gap:.1};"));
                self.children(element);
                self.close("});");
            }
            ComponentTag::Grid => {
                let columns = self
                    .literal_number(element, "columns")
                    .filter(|n| *n >= 1.0)
                    .map(|n| n as usize)
                    .unwrap_or(2);
                let gap = self.spacing(element);
                self.open(&format!(
                    "egui::Grid::new(\"{}\")",
                    escape_str(key)
                ));
                self.line(&format!(".num_columns({columns})"));
                self.line(&format!(".spacing(egui::vec2({gap:.1}, {gap:.1}))"));
                self.open(".show(ui, |ui| {");
                for (index, child) in element.children.clone().iter().enumerate() {
                    self.call_or_placeholder(child);
                    if (index + 1) % columns == 0 {
                        self.line("ui.end_row();");
                    }
                }
                self.close("});");
                self.indent -= 1;
            }
            ComponentTag::Flex => {
                let gap = self.spacing(element);
                self.open("ui.horizontal_wrapped(|ui| {");
                self.line(&format!(
                    "ui.spacing_mut().item_spacing = egui::vec2({gap:.1}, {gap:.1});"
                ));
                self.children(element);
                self.close("});");
            }
            ComponentTag::Box => {
                let padding = self.padding(element);
                self.open(&format!(
                    "egui::Frame::new().inner_margin(egui::Margin::same({padding})).show(ui, |ui| {{"
                ));
                self.children(element);
                self.close("});");
            }
            ComponentTag::Container => {
                let padding = self.padding(element);
                let fill = rgb(SURFACE_2);
                self.open(&format!(
                    "panel_frame({fill}, {padding}).show(ui, |ui| {{"
                ));
                self.children(element);
                self.close("});");
            }
            ComponentTag::Section => {
                self.open("ui.vertical(|ui| {");
                if let Some(title) = self.text_expr(element, &["title"]) {
                    self.label_line(&title, TEXT_PRIMARY, 15.0, true);
                }
                self.line("ui.separator();");
                self.children(element);
                self.close("});");
            }
            ComponentTag::Text => {
                let text = self
                    .text_expr(element, &["text"])
                    .unwrap_or_else(|| "\"\"".to_string());
                let muted = self
                    .literal_text(element, "muted")
                    .map(|raw| raw == "true")
                    .unwrap_or(false);
                let color = if muted { TEXT_MUTED } else { TEXT_PRIMARY };
                self.label_line(&text, color, 14.0, false);
            }
            ComponentTag::Heading => {
                let text = self
                    .text_expr(element, &["text"])
                    .unwrap_or_else(|| "\"\"".to_string());
                let level = self
                    .literal_number(element, "level")
                    .filter(|n| *n >= 1.0)
                    .map(|n| n as u64)
                    .unwrap_or(2);
                self.label_line(&text, TEXT_PRIMARY, contract::heading_points(level), true);
            }
            ComponentTag::Paragraph => {
                let text = self
                    .text_expr(element, &["text"])
                    .unwrap_or_else(|| "\"\"".to_string());
                self.label_line(&text, TEXT_PRIMARY, 14.0, false);
            }
            ComponentTag::Badge => {
                let text = self
                    .text_expr(element, &["text", "label"])
                    .unwrap_or_else(|| "\"\"".to_string());
                let tone = self.literal_text(element, "tone").unwrap_or_default();
                let accent = rgb(contract::tone_rgb(&tone));
                self.open("egui::Frame::new()");
                self.line(&format!(".fill({accent}.gamma_multiply(0.2))"));
                self.line(".corner_radius(egui::CornerRadius::same(8))");
                self.line(".inner_margin(egui::Margin::symmetric(8, 2))");
                self.open(".show(ui, |ui| {");
                self.line(&format!(
                    "ui.label(egui::RichText::new({text}).color({accent}).size(12.0));"
                ));
                self.close("});");
                self.indent -= 1;
            }
            ComponentTag::Metric => {
                self.open("ui.vertical(|ui| {");
                if let Some(label) = self.text_expr(element, &["label"]) {
                    self.label_line(&label, TEXT_MUTED, 12.0, false);
                }
                self.open("ui.horizontal(|ui| {");
                let value = self
                    .text_expr(element, &["value"])
                    .unwrap_or_else(|| "\"\"".to_string());
                self.label_line(&value, TEXT_PRIMARY, 22.0, true);
                if let Some(unit) = self.text_expr(element, &["unit"]) {
                    self.label_line(&unit, TEXT_MUTED, 12.0, false);
                }
                self.close("});");
                self.close("});");
            }
            ComponentTag::Alert => {
                let tone = self.literal_text(element, "tone").unwrap_or_default();
                let accent = rgb(contract::tone_rgb(&tone));
                self.open("egui::Frame::new()");
                self.line(&format!(".fill({accent}.gamma_multiply(0.15))"));
                self.line(&format!(".stroke(egui::Stroke::new(1.0, {accent}))"));
                self.line(".corner_radius(egui::CornerRadius::same(8))");
                self.line(".inner_margin(egui::Margin::same(12))");
                self.open(".show(ui, |ui| {");
                if let Some(title) = self.text_expr(element, &["title"]) {
                    self.line(&format!(
                        "ui.label(egui::RichText::new({title}).color({accent}).size(13.0).strong());"
                    ));
                }
                if let Some(message) = self.text_expr(element, &["message", "text"]) {
                    self.label_line(&message, TEXT_PRIMARY, 13.0, false);
                }
                self.close("});");
                self.indent -= 1;
            }
            ComponentTag::Image => {
                let alt = self
                    .text_expr(element, &["alt"])
                    .unwrap_or_else(|| "\"image\"".to_string());
                let fill = rgb(SURFACE_3);
                self.open(&format!("panel_frame({fill}, 12).show(ui, |ui| {{"));
                self.line(&format!(
                    "ui.label(egui::RichText::new(format!(\"[image] {{}}\", {alt})).color({}).size(13.0));",
                    rgb(TEXT_MUTED)
                ));
                if let Some(src) = self.text_expr(element, &["src", "url"]) {
                    self.label_line(&src, TEXT_MUTED, 11.0, false);
                }
                self.close("});");
            }
            ComponentTag::Code => {
                let language = self
                    .text_expr(element, &["language"])
                    .unwrap_or_else(|| "\"code\"".to_string());
                let code = self
                    .text_expr(element, &["code"])
                    .unwrap_or_else(|| "\"\"".to_string());
                self.open("card_frame().show(ui, |ui| {");
                self.label_line(&language, TEXT_MUTED, 12.0, false);
                self.line("ui.add_space(4.0);");
                self.line(&format!(
                    "ui.label(egui::RichText::new({code}).color({}).size(13.0).monospace());",
                    rgb(TEXT_PRIMARY)
                ));
                self.close("});");
            }
            ComponentTag::List => self.list_body(element),
            ComponentTag::Divider => self.line("ui.separator();"),
            ComponentTag::Table => self.table_body(key, element),
            ComponentTag::Progress => self.progress_body(element),
            ComponentTag::Button => self.button_body(element),
            ComponentTag::Input => self.input_body(element),
            ComponentTag::Select => self.select_body(key, element),
            ComponentTag::Checkbox => self.checkbox_body(element),
            ComponentTag::Link => self.link_body(element),
            ComponentTag::Map => self.map_body(element),
            ComponentTag::Chart => self.chart_body(element),
            ComponentTag::Diagram => self.diagram_body(element),
            ComponentTag::HtmlView => {
                let literal = self
                    .literal_text(element, "html")
                    .or_else(|| self.literal_text(element, "content"));
                let text = match literal {
                    Some(html) => format!("\"{}\"", escape_str(&contract::strip_tags(&html))),
                    // Dynamic markup is shown unstripped; the live canvas is
                    // the place for that.
                    None => self
                        .text_expr(element, &["html", "content"])
                        .unwrap_or_else(|| "\"\"".to_string()),
                };
                let fill = rgb(SURFACE_3);
                self.open(&format!("panel_frame({fill}, 12).show(ui, |ui| {{"));
                self.label_line(&text, TEXT_PRIMARY, 13.0, false);
                self.close("});");
            }
            ComponentTag::Embed => {
                self.line("// embedded documents render in the live canvas only");
                self.placeholder("embedded document");
            }
        }
    }

    fn list_body(&mut self, element: &ElementDef) {
        let Some(items) = element.props.get("items") else {
            return;
        };
        let ordered = self
            .literal_text(element, "ordered")
            .map(|raw| raw == "true")
            .unwrap_or(false);
        let muted = rgb(TEXT_MUTED);
        let primary = rgb(TEXT_PRIMARY);

        if !expr::is_dynamic(items) {
            let entries = items.as_array().cloned().unwrap_or_default();
            for (index, item) in entries.iter().enumerate() {
                let marker = if ordered {
                    format!("{}.", index + 1)
                } else {
                    "-".to_string()
                };
                self.open("ui.horizontal(|ui| {");
                self.line(&format!(
                    "ui.label(egui::RichText::new(\"{marker}\").color({muted}).size(14.0));"
                ));
                self.line(&format!(
                    "ui.label(egui::RichText::new(\"{}\").color({primary}).size(14.0));",
                    escape_str(&expr::display(item))
                ));
                self.close("});");
            }
            return;
        }

        let value = self.value_expr(items);
        self.line(&format!("let items = {value};"));
        self.line("let items = items.as_array().cloned().unwrap_or_default();");
        if ordered {
            self.open("for (index, item) in items.iter().enumerate() {");
            self.line("let marker = format!(\"{}.\", index + 1);");
        } else {
            self.open("for item in items.iter() {");
            self.line("let marker = \"-\".to_string();");
        }
        self.open("ui.horizontal(|ui| {");
        self.line(&format!(
            "ui.label(egui::RichText::new(marker).color({muted}).size(14.0));"
        ));
        self.line(&format!(
            "ui.label(egui::RichText::new(display(item)).color({primary}).size(14.0));"
        ));
        self.close("});");
        self.close("}");
    }

    fn table_body(&mut self, key: &str, element: &ElementDef) {
        let muted = rgb(TEXT_MUTED);
        let primary = rgb(TEXT_PRIMARY);
        self.open(&format!("egui::Grid::new(\"{}\")", escape_str(key)));
        self.line(".striped(true)");
        self.line(".spacing(egui::vec2(12.0, 4.0))");
        self.open(".show(ui, |ui| {");

        let columns = element.props.get("columns").cloned().unwrap_or(Value::Null);
        if let Some(names) = columns.as_array().filter(|_| !expr::is_dynamic(&columns)) {
            for name in names {
                self.line(&format!(
                    "ui.label(egui::RichText::new(\"{}\").color({muted}).size(12.0).strong());",
                    escape_str(&expr::display(name))
                ));
            }
            if !names.is_empty() {
                self.line("ui.end_row();");
            }
        }

        let rows = element.props.get("rows").cloned().unwrap_or(Value::Null);
        if !expr::is_dynamic(&rows) {
            for row in rows.as_array().cloned().unwrap_or_default() {
                let cells = row.as_array().cloned().unwrap_or_else(|| vec![row.clone()]);
                for cell in &cells {
                    self.line(&format!(
                        "ui.label(egui::RichText::new(\"{}\").color({primary}).size(13.0));",
                        escape_str(&expr::display(cell))
                    ));
                }
                self.line("ui.end_row();");
            }
        } else {
            let value = self.value_expr(&rows);
            self.line(&format!("let rows = {value};"));
            self.open("for row in rows.as_array().cloned().unwrap_or_default() {");
            self.line(
                "let cells = row.as_array().cloned().unwrap_or_else(|| vec![row.clone()]);",
            );
            self.open("for cell in &cells {");
            self.line(&format!(
                "ui.label(egui::RichText::new(display(cell)).color({primary}).size(13.0));"
            ));
            self.close("}");
            self.line("ui.end_row();");
            self.close("}");
        }

        self.close("});");
        self.indent -= 1;
    }

    fn progress_body(&mut self, element: &ElementDef) {
        let raw = element.props.get("value").cloned().unwrap_or(Value::Null);
        if expr::is_dynamic(&raw) {
            let value = self.value_expr(&raw);
            self.line(&format!("let level = to_number(&{value});"));
            self.line("let fraction = if level.is_nan() { 0.0 } else { (level / 100.0).clamp(0.0, 1.0) as f32 };");
        } else {
            let fraction = contract::progress_fraction(expr::to_number(&raw));
            self.line(&format!("let fraction = {fraction:.4};"));
        }
        match self.text_expr(element, &["label"]) {
            Some(label) => self.line(&format!(
                "ui.add(egui::ProgressBar::new(fraction).text({label}));"
            )),
            None => self.line("ui.add(egui::ProgressBar::new(fraction));"),
        }
    }

    fn button_body(&mut self, element: &ElementDef) {
        let label = self
            .text_expr(element, &["label", "text"])
            .unwrap_or_else(|| "\"Button\"".to_string());
        let primary = self.literal_text(element, "variant").as_deref() == Some("primary");
        let (fill, text_color) = if primary {
            (rgb(ACCENT), rgb(TEXT_ON_ACCENT))
        } else {
            (rgb(SURFACE_2), rgb(TEXT_PRIMARY))
        };
        self.open("let clicked = ui");
        self.open(&format!(
            ".add(egui::Button::new(egui::RichText::new({label}).color({text_color}).size(13.0))"
        ));
        self.line(&format!(".fill({fill})"));
        self.line(".corner_radius(egui::CornerRadius::same(8))");
        self.line(".min_size(egui::vec2(0.0, 35.0)))");
        self.indent -= 1;
        self.line(".clicked();");
        self.indent -= 1;
        if element.on.contains_key("press") {
            self.open("if clicked {");
            self.dispatch_call(element, "press");
            self.close("}");
        } else {
            self.line("let _ = clicked;");
        }
    }

    fn binding_path_of(&self, element: &ElementDef) -> String {
        let explicit = element.props.get("path").and_then(Value::as_str);
        let label = element
            .props
            .get("label")
            .and_then(Value::as_str)
            .unwrap_or("");
        contract::binding_path(explicit, label)
    }

    fn input_body(&mut self, element: &ElementDef) {
        let path = escape_str(&self.binding_path_of(element));
        if let Some(label) = self.text_expr(element, &["label"]) {
            self.label_line(&label, TEXT_MUTED, 12.0, false);
        }
        self.line(&format!(
            "let mut value = display(&get_path(&self.state, \"{path}\"));"
        ));
        let hint = self
            .text_expr(element, &["placeholder"])
            .unwrap_or_else(|| "\"\"".to_string());
        self.open("let changed = ui");
        self.line(&format!(
            ".add(egui::TextEdit::singleline(&mut value).desired_width(f32::INFINITY).hint_text({hint}))"
        ));
        self.line(".changed();");
        self.indent -= 1;
        self.open("if changed {");
        self.line(&format!(
            "set_path(&mut self.state, \"{path}\", Value::String(value));"
        ));
        self.dispatch_call(element, "change");
        self.close("}");
    }

    fn select_body(&mut self, key: &str, element: &ElementDef) {
        let path = escape_str(&self.binding_path_of(element));
        if let Some(label) = self.text_expr(element, &["label"]) {
            self.label_line(&label, TEXT_MUTED, 12.0, false);
        }
        let options = element.props.get("options").cloned().unwrap_or(Value::Null);
        let value = self.value_expr(&options);
        self.line(&format!("let options = {value};"));
        self.line("let options: Vec<String> = options.as_array().cloned().unwrap_or_default().iter().map(display).collect();");
        self.line(&format!(
            "let current = display(&get_path(&self.state, \"{path}\"));"
        ));
        self.open(&format!(
            "egui::ComboBox::from_id_salt(\"{}\")",
            escape_str(key)
        ));
        self.line(".selected_text(current.clone())");
        self.open(".show_ui(ui, |ui| {");
        self.open("for option in &options {");
        self.open("if ui.selectable_label(current == *option, option).clicked() {");
        self.line(&format!(
            "set_path(&mut self.state, \"{path}\", Value::String(option.clone()));"
        ));
        self.dispatch_call(element, "change");
        self.close("}");
        self.close("}");
        self.close("});");
        self.indent -= 1;
    }

    fn checkbox_body(&mut self, element: &ElementDef) {
        let path = escape_str(&self.binding_path_of(element));
        let label = self
            .text_expr(element, &["label"])
            .unwrap_or_else(|| "\"\"".to_string());
        self.line(&format!(
            "let mut checked = truthy(&get_path(&self.state, \"{path}\"));"
        ));
        self.open(&format!(
            "if ui.checkbox(&mut checked, egui::RichText::new({label}).color({}).size(13.0)).changed() {{",
            rgb(TEXT_PRIMARY)
        ));
        self.line(&format!(
            "set_path(&mut self.state, \"{path}\", Value::Bool(checked));"
        ));
        self.dispatch_call(element, "change");
        self.close("}");
    }

    fn link_body(&mut self, element: &ElementDef) {
        let url = self.text_expr(element, &["url", "href"]);
        let text = self
            .text_expr(element, &["text", "label"])
            .or_else(|| url.clone())
            .unwrap_or_else(|| "\"\"".to_string());
        if element.on.contains_key("press") {
            self.open(&format!("if ui.link({text}).clicked() {{"));
            self.dispatch_call(element, "press");
            self.close("}");
        } else if let Some(url) = url {
            self.line(&format!("ui.hyperlink_to({text}, {url});"));
        } else {
            self.label_line(&text, ACCENT, 14.0, false);
        }
    }

    fn map_body(&mut self, element: &ElementDef) {
        let fill = rgb(SURFACE_3);
        let accent = rgb(ACCENT);
        self.line("let size = egui::vec2(ui.available_width().max(120.0), 160.0);");
        self.line("let (rect, _response) = ui.allocate_exact_size(size, egui::Sense::hover());");
        self.line("let painter = ui.painter_at(rect);");
        self.line(&format!(
            "painter.rect_filled(rect, egui::CornerRadius::same(8), {fill});"
        ));

        // Markers are baked from the literal prop; dynamic markers belong to
        // the live canvas.
        let markers = element.props.get("markers").cloned().unwrap_or(Value::Null);
        if expr::is_dynamic(&markers) {
            return;
        }
        for marker in markers.as_array().cloned().unwrap_or_default() {
            let x = expr::to_number(marker.get("x").unwrap_or(&Value::Null));
            let y = expr::to_number(marker.get("y").unwrap_or(&Value::Null));
            if !x.is_finite() || !y.is_finite() {
                continue;
            }
            let x = x.clamp(0.0, 1.0);
            let y = y.clamp(0.0, 1.0);
            self.line(&format!(
                "let pos = rect.left_top() + egui::vec2({x:.4} * rect.width(), {y:.4} * rect.height());"
            ));
            self.line(&format!("painter.circle_filled(pos, 4.0, {accent});"));
            if let Some(label) = marker.get("label").and_then(Value::as_str) {
                self.line(&format!(
                    "painter.text(pos + egui::vec2(7.0, 0.0), egui::Align2::LEFT_CENTER, \"{}\", egui::FontId::proportional(11.0), {});",
                    escape_str(label),
                    rgb(TEXT_PRIMARY)
                ));
            }
        }
    }

    fn chart_body(&mut self, element: &ElementDef) {
        let fill = rgb(SURFACE_3);
        let accent = rgb(ACCENT);
        let muted = rgb(TEXT_MUTED);
        let raw = element.props.get("points").cloned().unwrap_or(Value::Null);
        let levels = if expr::is_dynamic(&raw) {
            Vec::new()
        } else {
            contract::chart_levels(&contract::numeric_points(&raw))
        };
        let line = self.literal_text(element, "kind").as_deref() == Some("line");

        self.line("let size = egui::vec2(ui.available_width().max(120.0), 120.0);");
        self.line("let (rect, _response) = ui.allocate_exact_size(size, egui::Sense::hover());");
        self.line("let painter = ui.painter_at(rect);");
        self.line(&format!(
            "painter.rect_filled(rect, egui::CornerRadius::same(8), {fill});"
        ));

        if levels.is_empty() {
            self.line(&format!(
                "painter.text(rect.center(), egui::Align2::CENTER_CENTER, \"no data\", egui::FontId::proportional(12.0), {muted});"
            ));
            return;
        }

        let baked: Vec<String> = levels.iter().map(|level| format!("{level:.4}")).collect();
        self.line(&format!("let levels: &[f32] = &[{}];", baked.join(", ")));
        self.line("let inner = rect.shrink(8.0);");
        self.line("let step = inner.width() / levels.len() as f32;");
        if line {
            self.line("let mut previous: Option<egui::Pos2> = None;");
            self.open("for (index, level) in levels.iter().enumerate() {");
            self.line("let pos = egui::pos2(inner.left() + step * (index as f32 + 0.5), inner.bottom() - level * inner.height());");
            self.open("if let Some(prev) = previous {");
            self.line(&format!(
                "painter.line_segment([prev, pos], egui::Stroke::new(2.0, {accent}));"
            ));
            self.close("}");
            self.line(&format!("painter.circle_filled(pos, 2.5, {accent});"));
            self.line("previous = Some(pos);");
            self.close("}");
        } else {
            self.open("for (index, level) in levels.iter().enumerate() {");
            self.line("let left = inner.left() + step * index as f32 + step * 0.15;");
            self.line("let bar = egui::Rect::from_min_max(egui::pos2(left, inner.bottom() - level * inner.height()), egui::pos2(left + step * 0.7, inner.bottom()));");
            self.line(&format!(
                "painter.rect_filled(bar, egui::CornerRadius::same(2), {accent});"
            ));
            self.close("}");
        }
    }

    fn diagram_body(&mut self, element: &ElementDef) {
        let source = self
            .literal_text(element, "source")
            .or_else(|| self.literal_text(element, "text"))
            .unwrap_or_default();
        let edges = match contract::parse_diagram(&source) {
            Ok(edges) => edges,
            Err(message) => {
                self.placeholder(&format!("diagram error: {message}"));
                return;
            }
        };
        let nodes = contract::diagram_nodes(&edges);
        if nodes.is_empty() {
            self.placeholder("empty diagram");
            return;
        }

        let fill = rgb(SURFACE_3);
        let surface = rgb(SURFACE_2);
        let accent = rgb(ACCENT);
        let baked_nodes: Vec<String> = nodes
            .iter()
            .map(|node| format!("\"{}\"", escape_str(node)))
            .collect();
        let baked_edges: Vec<String> = edges
            .iter()
            .map(|(from, to)| {
                let from = nodes.iter().position(|n| n == from).unwrap_or(0);
                let to = nodes.iter().position(|n| n == to).unwrap_or(0);
                format!("({from}, {to})")
            })
            .collect();

        self.line(&format!(
            "let nodes: &[&str] = &[{}];",
            baked_nodes.join(", ")
        ));
        self.line(&format!(
            "let edges: &[(usize, usize)] = &[{}];",
            baked_edges.join(", ")
        ));
        self.line("let row_height = 40.0;");
        self.line("let size = egui::vec2(ui.available_width().max(120.0), row_height * nodes.len() as f32 + 16.0);");
        self.line("let (rect, _response) = ui.allocate_exact_size(size, egui::Sense::hover());");
        self.line("let painter = ui.painter_at(rect);");
        self.line(&format!(
            "painter.rect_filled(rect, egui::CornerRadius::same(8), {fill});"
        ));
        self.line("let box_width = (rect.width() * 0.5).min(220.0);");
        self.line("let node_rect = |index: usize| egui::Rect::from_min_size(egui::pos2(rect.center().x - box_width / 2.0, rect.top() + 8.0 + row_height * index as f32), egui::vec2(box_width, row_height - 12.0));");
        self.open("for (from, to) in edges {");
        self.line("let a = node_rect(*from).center_bottom();");
        self.line("let b = node_rect(*to).center_top();");
        self.line(&format!(
            "painter.line_segment([a, b], egui::Stroke::new(1.5, {accent}));"
        ));
        self.line(&format!("painter.circle_filled(b, 3.0, {accent});"));
        self.close("}");
        self.open("for (index, node) in nodes.iter().enumerate() {");
        self.line("let rect = node_rect(index);");
        self.line(&format!(
            "painter.rect_filled(rect, egui::CornerRadius::same(8), {surface});"
        ));
        self.line(&format!(
            "painter.text(rect.center(), egui::Align2::CENTER_CENTER, *node, egui::FontId::proportional(13.0), {});",
            rgb(TEXT_PRIMARY)
        ));
        self.close("}");
    }

    fn style_helpers(&mut self) {
        self.open("fn panel_frame(fill: egui::Color32, padding: i8) -> egui::Frame {");
        self.open("egui::Frame::new()");
        self.line(".fill(fill)");
        self.line(".inner_margin(egui::Margin::same(padding))");
        self.line(".corner_radius(egui::CornerRadius::same(12))");
        self.indent -= 1;
        self.close("}");
        self.line("");
        self.open("fn card_frame() -> egui::Frame {");
        self.line(&format!("panel_frame({}, 12)", rgb(SURFACE_2)));
        self.close("}");
    }
}

fn ident(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for ch in key.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push('_');
        }
    }
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        format!("k{out}")
    } else {
        out
    }
}

fn emit_raw_viewer(document: &Value, name: &str) -> String {
    let pretty = serde_json::to_string_pretty(document).unwrap_or_default();
    let raw = raw_literal(&pretty);
    let muted = rgb(TEXT_MUTED);
    format!(
        "// {name}: generated canvas snapshot.\n\
         // The source document was not renderable; this viewer shows it verbatim.\n\
         // Build with: eframe = \"0.31\"\n\
         \n\
         use eframe::egui;\n\
         \n\
         fn main() -> eframe::Result {{\n\
         \x20   let options = eframe::NativeOptions::default();\n\
         \x20   eframe::run_native(\n\
         \x20       \"{name}\",\n\
         \x20       options,\n\
         \x20       Box::new(|_cc| Ok(Box::new({name}::default()))),\n\
         \x20   )\n\
         }}\n\
         \n\
         #[derive(Default)]\n\
         struct {name};\n\
         \n\
         impl eframe::App for {name} {{\n\
         \x20   fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {{\n\
         \x20       egui::CentralPanel::default().show(ctx, |ui| {{\n\
         \x20           egui::ScrollArea::vertical().show(ui, |ui| {{\n\
         \x20               ui.label(egui::RichText::new({raw}).color({muted}).monospace());\n\
         \x20           }});\n\
         \x20       }});\n\
         \x20   }}\n\
         }}\n"
    )
}

/// Helper source embedded in stateful programs. The same file is compiled
/// into this crate as `canvas::emit_runtime`, so the embedded evaluator and
/// dispatcher are the code the parity tests exercise, not a copy that can
/// drift. In a standalone program `navigate` and `submit` degrade to stderr
/// lines.
const RUNTIME_HELPERS: &str = include_str!("emit_runtime.rs");

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn static_doc() -> Value {
        json!({
            "root": "card",
            "elements": {
                "card": { "type": "Card", "props": { "title": "Static" }, "children": ["line"] },
                "line": { "type": "Text", "props": { "text": "hello" } }
            }
        })
    }

    #[test]
    fn static_documents_emit_stateless_programs() {
        let source = emit_source(&static_doc(), "demo");
        assert!(source.contains("struct Demo;"));
        assert!(source.contains("\"hello\""));
        assert!(!source.contains("state: Value"));
        assert!(!source.contains("fn get_path"));
        assert!(!source.contains("serde_json"));
    }

    #[test]
    fn dynamic_props_force_the_stateful_shape() {
        let doc = json!({
            "root": "line",
            "elements": {
                "line": { "type": "Text", "props": { "text": { "$template": "Hi ${/form/name}" } } }
            }
        });
        let source = emit_source(&doc, "demo");
        assert!(source.contains("struct Demo {"));
        assert!(source.contains("state: Value"));
        assert!(source.contains("render_template(\"Hi ${/form/name}\", &self.state)"));
        assert!(source.contains("fn get_path"));
        assert!(source.contains("fn dispatch"));
    }

    #[test]
    fn controls_force_the_stateful_shape_and_carry_their_binding_path() {
        let doc = json!({
            "root": "email",
            "elements": {
                "email": { "type": "Input", "props": { "label": "Email" } }
            }
        });
        let source = emit_source(&doc, "demo");
        assert!(source.contains("state: Value"));
        assert!(source.contains("\"/form/email\""));
        assert!(source.contains("set_path(&mut self.state, \"/form/email\""));
    }

    #[test]
    fn event_bindings_embed_their_json_and_route_through_dispatch() {
        let doc = json!({
            "root": "btn",
            "elements": {
                "btn": {
                    "type": "Button",
                    "props": { "label": "Go" },
                    "on": { "press": { "action": "setState", "actionParams": { "path": "/x", "value": 1 } } }
                }
            }
        });
        let source = emit_source(&doc, "demo");
        assert!(source.contains("self.dispatch_binding("));
        assert!(source.contains("\"action\":\"setState\""));
        assert!(source.contains("if clicked {"));
    }

    #[test]
    fn press_on_a_non_interactive_element_emits_the_click_wrapper() {
        let doc = json!({
            "root": "card",
            "elements": {
                "card": {
                    "type": "Card",
                    "props": {},
                    "on": { "press": { "action": "toggleState", "actionParams": { "path": "/open" } } }
                }
            }
        });
        let source = emit_source(&doc, "demo");
        assert!(source.contains(".interact(egui::Sense::click())"));
    }

    #[test]
    fn text_is_escaped_into_valid_string_literals() {
        let doc = json!({
            "root": "line",
            "elements": {
                "line": { "type": "Text", "props": { "text": "say \"hi\"\\ and\nnewline" } }
            }
        });
        let source = emit_source(&doc, "demo");
        assert!(source.contains(r#""say \"hi\"\\ and\nnewline""#));
        assert!(!source.contains("say \"hi\"\\ and\nnewline"));
    }

    #[test]
    fn unknown_types_emit_a_comment_and_placeholder() {
        let doc = json!({
            "root": "widget",
            "elements": {
                "widget": { "type": "Carousel3000", "props": {} }
            }
        });
        let source = emit_source(&doc, "demo");
        assert!(source.contains("// unsupported component `Carousel3000`"));
        assert!(source.contains("unsupported component `Carousel3000`"));
    }

    #[test]
    fn visible_conditions_gate_the_emitted_body() {
        let doc = json!({
            "root": "alert",
            "elements": {
                "alert": {
                    "type": "Alert",
                    "props": { "message": "done" },
                    "visible": { "path": "/submitted" }
                }
            }
        });
        let source = emit_source(&doc, "demo");
        assert!(source.contains("if !eval_condition("));
        assert!(source.contains(r#"{"path":"/submitted"}"#));
    }

    #[test]
    fn style_numbers_come_from_the_shared_contract() {
        let doc = json!({
            "root": "col",
            "elements": {
                "col": { "type": "Column", "props": { "spacing": "lg" }, "children": ["h", "b"] },
                "h": { "type": "Heading", "props": { "text": "Title", "level": 1 } },
                "b": { "type": "Badge", "props": { "text": "new", "tone": "warning" } }
            }
        });
        let source = emit_source(&doc, "demo");
        assert!(source.contains(&format!(
            "item_spacing.y = {:.1}",
            contract::spacing_points("lg")
        )));
        assert!(source.contains(&format!("size({:.1})", contract::heading_points(1))));
        let (r, g, b) = contract::tone_rgb("warning");
        assert!(source.contains(&format!("egui::Color32::from_rgb({r}, {g}, {b})")));
    }

    #[test]
    fn app_names_sanitize_to_camel_case_idents() {
        assert_eq!(sanitize_name("my cool app!"), "MyCoolApp");
        assert_eq!(sanitize_name("dash-board_v2"), "DashBoardV2");
        assert_eq!(sanitize_name("42nd street"), "Canvas42ndStreet");
        assert_eq!(sanitize_name("!!!"), "Canvas");
    }

    #[test]
    fn raw_literals_out_hash_their_content() {
        assert_eq!(raw_literal("plain"), "r#\"plain\"#");
        let tricky = r##"a "# b"##;
        let literal = raw_literal(tricky);
        assert!(literal.starts_with("r##\""));
        assert!(literal.ends_with("\"##"));
    }

    #[test]
    fn unrenderable_documents_emit_a_raw_viewer() {
        let source = emit_source(&json!(["nope"]), "demo");
        assert!(source.contains("not renderable"));
        assert!(source.contains("struct Demo;"));
        assert!(source.contains("\"nope\""));
    }

    #[test]
    fn fixture_emits_a_stateful_program_matching_the_live_canvas() {
        let doc: Value =
            serde_json::from_str(include_str!("fixture.json")).expect("fixture should parse");
        let source = emit_source(&doc, "signup");

        // Same binding path the live Input uses.
        assert!(source.contains("\"/form/email\""));
        // Same action JSON the live dispatcher receives.
        assert!(source.contains("\"action\":\"sequence\""));
        // Same initial state.
        assert!(source.contains("\"submitted\":false"));
        // The gated alert carries its condition.
        assert!(source.contains(r#"{"path":"/submitted"}"#));
        // One render fn per element.
        for key in ["card", "heading", "greeting", "email", "submit", "items", "done", "badge", "rule"] {
            assert!(source.contains(&format!("fn el_{key}(")), "missing fn for {key}");
        }
    }

    #[test]
    fn stateful_programs_embed_the_compiled_helper_module() {
        let doc = json!({
            "root": "line",
            "elements": {
                "line": { "type": "Text", "props": { "text": { "$path": "/msg" } } }
            }
        });
        let source = emit_source(&doc, "demo");
        assert!(source.contains(include_str!("emit_runtime.rs")));
    }

    #[test]
    fn embedded_condition_evaluator_matches_the_live_one() {
        use crate::canvas::emit_runtime;
        use crate::canvas::state::StateStore;

        let state = json!({ "count": 10, "label": "abc", "flag": true });
        let store = StateStore::new(state.clone());
        let lookup = |path: &str| store.get(path);

        let conditions = [
            json!({ "eq": [1], "and": [true] }),
            json!({ "eq": 1, "or": [true] }),
            json!({ "gt": [{ "$path": "/count" }, 5] }),
            json!({ "lte": [{ "$path": "/label" }, 5] }),
            json!({ "and": [{ "path": "/flag" }, { "ne": [1, 2] }] }),
            json!({ "not": { "path": "/missing" } }),
            json!({ "between": [1, 2, 3] }),
            json!("bare"),
            json!(0),
        ];
        for cond in &conditions {
            assert_eq!(
                emit_runtime::eval_condition(cond, &state),
                expr::eval_condition(cond, &lookup),
                "evaluators disagree on {cond}"
            );
        }
        // Both sides settle a broken comparator as false instead of falling
        // through to the trailing connective.
        assert!(!emit_runtime::eval_condition(&json!({ "eq": [1], "and": [true] }), &state));
    }

    #[test]
    fn embedded_resolution_matches_the_live_resolver() {
        use crate::canvas::emit_runtime;
        use crate::canvas::state::StateStore;

        let state = json!({ "user": { "name": "Ada" }, "n": 2 });
        let store = StateStore::new(state.clone());
        let lookup = |path: &str| store.get(path);

        let values = [
            json!({ "$path": "/user/name" }),
            json!({ "$path": "/user/missing" }),
            json!({ "$template": "Hi ${/user/name} (${/user/missing})" }),
            json!({ "$concat": ["n=", { "$path": "/n" }, true] }),
            json!({ "rows": [{ "$path": "/n" }, "x"], "fixed": 1 }),
        ];
        for value in &values {
            assert_eq!(
                emit_runtime::resolve_value(value, &state),
                expr::resolve(value, &lookup),
                "resolvers disagree on {value}"
            );
        }
    }

    #[test]
    fn embedded_dispatch_matches_the_live_dispatcher_on_the_signup_flow() {
        use crate::canvas::action;
        use crate::canvas::emit_runtime;
        use crate::canvas::state::StateStore;

        let doc: Value =
            serde_json::from_str(include_str!("fixture.json")).expect("fixture should parse");
        let normalized = spec::normalize(&doc).expect("fixture should normalize");
        let binding = normalized.elements["submit"].on["press"].clone();

        // Live path: store plus dispatcher, effects surfaced to the shell.
        let mut store = StateStore::new(normalized.state.clone());
        store.set("/form/email", json!("ada@example.com"));
        let mut effects = Vec::new();
        action::dispatch_binding(&mut store, &binding, &mut |effect| effects.push(effect));

        // Embedded path: the same binding JSON a generated program carries,
        // routed through the compiled helper module.
        let mut state = normalized.state.clone();
        emit_runtime::set_path(&mut state, "/form/email", json!("ada@example.com"));
        let raw = serde_json::to_string(&binding).expect("binding serializes");
        let parsed = emit_runtime::parse_json(&raw);
        let name = parsed.get("action").and_then(Value::as_str).unwrap_or("");
        let params = parsed.get("actionParams").cloned().unwrap_or(Value::Null);
        emit_runtime::dispatch(&mut state, name, &params);

        assert_eq!(store.snapshot(), state);
        assert_eq!(effects.len(), 1);
    }
}
