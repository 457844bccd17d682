use crate::canvas::action::{self, CanvasEffect, EffectLog};
use crate::canvas::registry::{ComponentRegistry, RenderFrame};
use crate::canvas::spec::{self, CanvasSpec};
use crate::canvas::state::StateStore;
use crate::theme::Theme;
use eframe::egui::{self, RichText};
use serde_json::Value;

/// One live canvas: the normalized document, its state, and the effects its
/// actions have produced. Loading is total; a document that does not
/// normalize is kept verbatim and rendered as pretty-printed JSON so the
/// hosting shell never has to special-case bad input.
pub struct CanvasRuntime {
    registry: ComponentRegistry,
    spec: Option<CanvasSpec>,
    raw_document: Option<Value>,
    store: StateStore,
    effects: EffectLog,
}

impl CanvasRuntime {
    pub fn new() -> Self {
        Self {
            registry: ComponentRegistry::new(),
            spec: None,
            raw_document: None,
            store: StateStore::default(),
            effects: EffectLog::default(),
        }
    }

    /// Swaps in a new document. State resets to the document's declared
    /// initial state; the effect log carries over so the shell's history
    /// survives document updates.
    pub fn load_document(&mut self, document: &Value) {
        self.raw_document = Some(document.clone());
        match spec::normalize(document) {
            Some(normalized) => {
                self.store = StateStore::new(normalized.state.clone());
                self.spec = Some(normalized);
            }
            None => {
                self.spec = None;
                self.store = StateStore::default();
            }
        }
    }

    pub fn has_canvas(&self) -> bool {
        self.spec.is_some()
    }

    pub fn raw_document(&self) -> Option<&Value> {
        self.raw_document.as_ref()
    }

    pub fn state_snapshot(&self) -> Value {
        self.store.snapshot()
    }

    pub fn effect_log(&self) -> &[CanvasEffect] {
        self.effects.entries()
    }

    pub fn drain_effects(&mut self) -> Vec<CanvasEffect> {
        self.effects.drain()
    }

    pub fn render_canvas(&mut self, ui: &mut egui::Ui, theme: &Theme) {
        let Self {
            registry,
            spec,
            raw_document,
            store,
            effects,
        } = self;

        let Some(spec) = spec.as_ref() else {
            render_raw_fallback(ui, theme, raw_document.as_ref());
            return;
        };

        let mut emit = |effect: CanvasEffect| effects.push(effect);
        let mut frame = RenderFrame {
            spec,
            store,
            theme,
            emit: &mut emit,
            depth: 0,
        };
        registry.render_element(&mut frame, &spec.root.clone(), ui);
    }

    #[cfg(test)]
    pub fn simulate_press(&mut self, key: &str) {
        let Some(binding) = self
            .spec
            .as_ref()
            .and_then(|spec| spec.elements.get(key))
            .and_then(|element| element.on.get("press"))
            .cloned()
        else {
            return;
        };
        let effects = &mut self.effects;
        action::dispatch_binding(&mut self.store, &binding, &mut |effect| {
            effects.push(effect)
        });
    }

    #[cfg(test)]
    pub fn simulate_input(&mut self, key: &str, text: &str) {
        use crate::canvas::contract;

        let Some(element) = self.spec.as_ref().and_then(|spec| spec.elements.get(key)) else {
            return;
        };
        let explicit = element.props.get("path").and_then(Value::as_str);
        let label = element
            .props
            .get("label")
            .and_then(Value::as_str)
            .unwrap_or("");
        let path = contract::binding_path(explicit, label);
        let change = element.on.get("change").cloned();

        self.store.set(&path, Value::String(text.to_string()));
        if let Some(binding) = change {
            let effects = &mut self.effects;
            action::dispatch_binding(&mut self.store, &binding, &mut |effect| {
                effects.push(effect)
            });
        }
    }
}

impl Default for CanvasRuntime {
    fn default() -> Self {
        Self::new()
    }
}

fn render_raw_fallback(ui: &mut egui::Ui, theme: &Theme, raw: Option<&Value>) {
    let Some(raw) = raw else {
        return;
    };
    theme.card_frame().show(ui, |ui| {
        ui.label(
            RichText::new("Document is not renderable; showing raw JSON")
                .color(theme.warning)
                .size(12.0),
        );
        ui.add_space(theme.spacing_8);
        let pretty = serde_json::to_string_pretty(raw).unwrap_or_default();
        ui.label(
            RichText::new(pretty)
                .color(theme.text_muted)
                .size(12.0)
                .monospace(),
        );
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture() -> Value {
        serde_json::from_str(include_str!("fixture.json")).expect("fixture should parse")
    }

    #[test]
    fn fixture_loads_and_runs_the_signup_flow() {
        let mut runtime = CanvasRuntime::new();
        runtime.load_document(&fixture());
        assert!(runtime.has_canvas());

        runtime.simulate_input("email", "ada@example.com");
        assert_eq!(
            runtime.state_snapshot().pointer("/form/email"),
            Some(&json!("ada@example.com"))
        );

        runtime.simulate_press("submit");
        assert_eq!(
            runtime.state_snapshot().pointer("/submitted"),
            Some(&json!(true))
        );
        assert_eq!(
            runtime.effect_log(),
            &[CanvasEffect::Submitted {
                data: json!({ "email": "ada@example.com" })
            }]
        );

        let drained = runtime.drain_effects();
        assert_eq!(drained.len(), 1);
        assert!(runtime.effect_log().is_empty());
    }

    #[test]
    fn replayed_interactions_produce_identical_effects() {
        let run = || {
            let mut runtime = CanvasRuntime::new();
            runtime.load_document(&fixture());
            runtime.simulate_input("email", "grace@example.com");
            runtime.simulate_press("submit");
            runtime.simulate_press("submit");
            runtime.effect_log().to_vec()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn canvas_presses_match_direct_dispatch() {
        // Proving the canvas path equals the direct dispatcher path on
        // identical input is what keeps the interaction hooks honest.
        let document = fixture();
        let mut through_canvas = CanvasRuntime::new();
        through_canvas.load_document(&document);
        through_canvas.simulate_press("submit");

        let normalized = spec::normalize(&document).expect("fixture should normalize");
        let mut store = StateStore::new(normalized.state.clone());
        let binding = normalized.elements["submit"].on["press"].clone();
        let mut effects = Vec::new();
        action::dispatch_binding(&mut store, &binding, &mut |effect| effects.push(effect));

        assert_eq!(through_canvas.state_snapshot(), store.snapshot());
        assert_eq!(through_canvas.effect_log(), effects.as_slice());
    }

    #[test]
    fn unrenderable_document_keeps_the_raw_json() {
        let mut runtime = CanvasRuntime::new();
        let raw = json!(["not", "a", "document"]);
        runtime.load_document(&raw);
        assert!(!runtime.has_canvas());
        assert_eq!(runtime.raw_document(), Some(&raw));
    }

    #[test]
    fn reloading_a_document_resets_state_but_keeps_effects() {
        let mut runtime = CanvasRuntime::new();
        runtime.load_document(&fixture());
        runtime.simulate_press("submit");
        assert_eq!(runtime.effect_log().len(), 1);

        runtime.load_document(&fixture());
        assert_eq!(
            runtime.state_snapshot().pointer("/submitted"),
            Some(&json!(false))
        );
        assert_eq!(runtime.effect_log().len(), 1);
    }

    #[test]
    fn headless_frame_renders_without_panicking() {
        let mut runtime = CanvasRuntime::new();
        runtime.load_document(&fixture());
        let theme = Theme::default();

        let ctx = egui::Context::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                runtime.render_canvas(ui, &theme);
            });
        });

        // The gated alert is hidden, nothing dispatched, no effects.
        assert!(runtime.effect_log().is_empty());
    }

    #[test]
    fn headless_frame_renders_the_fallback_too() {
        let mut runtime = CanvasRuntime::new();
        runtime.load_document(&json!({ "totally": "unrelated" }));
        let theme = Theme::default();

        let ctx = egui::Context::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                runtime.render_canvas(ui, &theme);
            });
        });
    }
}
