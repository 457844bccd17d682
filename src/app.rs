use crate::canvas::emit;
use crate::canvas::runtime::CanvasRuntime;
use crate::event::AppEvent;
use crate::theme::Theme;
use eframe::egui::{self, RichText, ScrollArea};
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub struct GlazeApp {
    rx: Receiver<AppEvent>,
    runtime: CanvasRuntime,
    theme: Theme,
    document_path: PathBuf,
    document_name: String,
    diagnostics_log: Vec<String>,
    effect_lines: Vec<String>,
    export_status: Option<String>,
    styled: bool,
}

impl GlazeApp {
    pub fn new(rx: Receiver<AppEvent>, document_path: PathBuf) -> Self {
        let document_name = document_path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("canvas")
            .to_string();
        Self {
            rx,
            runtime: CanvasRuntime::new(),
            theme: Theme::default(),
            document_path,
            document_name,
            diagnostics_log: Vec::new(),
            effect_lines: Vec::new(),
            export_status: None,
            styled: false,
        }
    }

    fn timestamp() -> String {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(duration) => duration.as_secs().to_string(),
            Err(_) => "0".to_string(),
        }
    }

    fn log_diagnostic(&mut self, message: impl Into<String>) {
        self.diagnostics_log
            .push(format!("[{}] {}", Self::timestamp(), message.into()));
    }

    fn drain_events(&mut self, ctx: &egui::Context) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => self.apply_event(event, ctx),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.log_diagnostic("feed channel disconnected");
                    break;
                }
            }
        }
    }

    fn apply_event(&mut self, event: AppEvent, ctx: &egui::Context) {
        match event {
            AppEvent::DocumentLoaded(document) => {
                self.runtime.load_document(&document);
                if self.runtime.has_canvas() {
                    self.log_diagnostic("document loaded");
                } else {
                    self.log_diagnostic("document loaded but not renderable; showing raw JSON");
                }
                ctx.request_repaint();
            }
            AppEvent::FeedError(message) => {
                self.log_diagnostic(format!("feed error: {message}"));
            }
        }
    }

    fn export_source(&mut self) {
        let Some(document) = self.runtime.raw_document().cloned() else {
            self.export_status = Some("nothing to export yet".to_string());
            return;
        };
        let source = emit::emit_source(&document, &self.document_name);
        let out_path = self
            .document_path
            .with_file_name(format!("{}_export.rs", self.document_name));
        match std::fs::write(&out_path, source) {
            Ok(()) => {
                self.export_status = Some(format!("exported to {}", out_path.display()));
                self.log_diagnostic(format!("exported source to {}", out_path.display()));
            }
            Err(err) => {
                self.export_status = Some(format!("export failed: {err}"));
                self.log_diagnostic(format!("export failed: {err}"));
            }
        }
    }

    fn handle_effects(&mut self, ctx: &egui::Context) {
        for effect in self.runtime.drain_effects() {
            self.effect_lines.push(effect.to_log_line());
            if let crate::canvas::action::CanvasEffect::Navigated { url } = &effect {
                ctx.open_url(egui::OpenUrl::new_tab(url));
            }
        }
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("Glaze");
                ui.separator();
                ui.label(
                    RichText::new(self.document_path.display().to_string())
                        .color(self.theme.text_muted),
                );
                ui.separator();
                if ui.button("Export source").clicked() {
                    self.export_source();
                }
                if let Some(status) = &self.export_status {
                    ui.label(RichText::new(status).color(self.theme.text_muted).size(12.0));
                }
            });
        });
    }

    fn render_center_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let canvas_height = (ui.available_height() - 140.0).max(120.0);
            ScrollArea::vertical()
                .id_salt("canvas")
                .max_height(canvas_height)
                .show(ui, |ui| {
                    let Self { runtime, theme, .. } = self;
                    runtime.render_canvas(ui, theme);
                });

            ui.separator();
            egui::CollapsingHeader::new("Effects")
                .default_open(false)
                .show(ui, |ui| {
                    ScrollArea::vertical()
                        .id_salt("effect_log")
                        .max_height(90.0)
                        .stick_to_bottom(true)
                        .show(ui, |ui| {
                            if self.effect_lines.is_empty() {
                                ui.label(
                                    RichText::new("no effects yet")
                                        .color(self.theme.text_muted)
                                        .size(12.0),
                                );
                            }
                            for entry in &self.effect_lines {
                                ui.label(entry);
                            }
                        });
                });

            egui::CollapsingHeader::new("Diagnostics")
                .default_open(false)
                .show(ui, |ui| {
                    ScrollArea::vertical()
                        .id_salt("diagnostics_log")
                        .max_height(90.0)
                        .stick_to_bottom(true)
                        .show(ui, |ui| {
                            for entry in &self.diagnostics_log {
                                ui.label(entry);
                            }
                        });
                });
        });
    }
}

impl eframe::App for GlazeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.styled {
            self.theme.apply_visuals(ctx);
            self.styled = true;
        }
        self.drain_events(ctx);
        self.render_top_bar(ctx);
        self.render_center_panel(ctx);
        self.handle_effects(ctx);
        // The feed polls every half second; wake up at the same cadence so
        // its events surface without user input.
        ctx.request_repaint_after(Duration::from_millis(500));
    }
}
