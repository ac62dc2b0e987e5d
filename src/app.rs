use egui::{pos2, Color32, Rect, Sense, TextureHandle, TextureOptions, Vec2};
use log::{error, info, warn};
use crate::compositor::ScreenRaster;
use crate::config::EditorConfig;
use crate::input::{InputEvent, InputHandler};
use crate::layer::LayerId;
use crate::state::EditorState;
use crate::tools::{Tool, ToolKind};

/// Layer panel actions, applied after the panel is drawn.
enum LayerAction {
    Add,
    Remove(LayerId),
    Select(LayerId),
    SetVisible(LayerId, bool),
}

/// eframe host: side panel for tools and layers, the canvas in the center.
pub struct PaintApp {
    editor: Option<EditorState>,
    /// Why `editor` is missing
    startup_error: Option<String>,
    raster: ScreenRaster,
    texture: Option<TextureHandle>,
    input_handler: InputHandler,
    needs_full_redraw: bool,
}

impl std::fmt::Debug for PaintApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaintApp")
            .field("editor", &self.editor.is_some())
            .field("raster", &self.raster)
            .finish_non_exhaustive()
    }
}

impl PaintApp {
    /// Called once before the first frame.
    ///
    /// `config` overrides the config restored from the previous session.
    pub fn new(cc: &eframe::CreationContext<'_>, config: Option<EditorConfig>) -> Self {
        let config = config
            .or_else(|| cc.storage.and_then(|storage| eframe::get_value(storage, eframe::APP_KEY)))
            .unwrap_or_default();
        Self::with_config(config)
    }

    pub fn with_config(config: EditorConfig) -> Self {
        let editor = EditorState::new(config).or_else(|err| {
            warn!("Rejected editor config ({err}); falling back to defaults");
            EditorState::new(EditorConfig::default())
        });
        let (editor, startup_error) = match editor {
            Ok(editor) => (Some(editor), None),
            Err(err) => {
                error!("Failed to create editor: {err}");
                (None, Some(err.to_string()))
            }
        };
        Self {
            editor,
            startup_error,
            raster: ScreenRaster::new(1, 1),
            texture: None,
            input_handler: InputHandler::new(Rect::NOTHING),
            needs_full_redraw: true,
        }
    }

    pub fn editor(&self) -> Option<&EditorState> {
        self.editor.as_ref()
    }

    fn side_panel(&mut self, ctx: &egui::Context) {
        let Some(editor) = self.editor.as_mut() else { return };

        egui::SidePanel::left("tools_panel")
            .resizable(true)
            .default_width(200.0)
            .show(ctx, |ui| {
                ui.heading("Tools");
                let active = editor.current_tool().kind();
                for kind in ToolKind::all() {
                    if ui.selectable_label(active == *kind, kind.label()).clicked() && active != *kind {
                        info!("Tool selected from UI: {}", kind.label());
                        if let Err(err) = editor.set_tool(*kind) {
                            error!("Could not switch to {}: {err}", kind.label());
                        }
                        self.needs_full_redraw = true;
                    }
                }

                ui.separator();
                let mut pixel_size = editor.pixel_size();
                if ui.add(egui::Slider::new(&mut pixel_size, 1..=20).text("Zoom")).changed() {
                    if let Err(err) = editor.set_pixel_size(pixel_size) {
                        warn!("{err}");
                    }
                    self.needs_full_redraw = true;
                }

                ui.separator();
                ui.heading("Layers");
                let mut action = None;
                let current = editor.current_layer_id();
                // top of the stack first
                for layer in editor.layers().iter().rev() {
                    ui.horizontal(|ui| {
                        let mut visible = !layer.is_hidden();
                        if ui.checkbox(&mut visible, "").changed() {
                            action = Some(LayerAction::SetVisible(layer.id(), visible));
                        }
                        let label = format!("{} ({})", layer.name(), layer.committed_buffers().len());
                        if ui.selectable_label(current == Some(layer.id()), label).clicked() {
                            action = Some(LayerAction::Select(layer.id()));
                        }
                        if ui.small_button("✖").clicked() {
                            action = Some(LayerAction::Remove(layer.id()));
                        }
                    });
                }
                if ui.button("Add Layer").clicked() {
                    action = Some(LayerAction::Add);
                }

                let result = match action {
                    Some(LayerAction::Add) => {
                        editor.add_layer();
                        Ok(())
                    }
                    Some(LayerAction::Remove(id)) => editor.remove_layer(id).map(drop),
                    Some(LayerAction::Select(id)) => editor.select_layer(id),
                    Some(LayerAction::SetVisible(id, visible)) => editor.set_layer_visibility(id, visible),
                    None => return,
                };
                if let Err(err) = result {
                    warn!("Layer action failed: {err}");
                }
                self.needs_full_redraw = true;
            });
    }

    fn canvas(&mut self, ui: &mut egui::Ui) {
        let Some(editor) = self.editor.as_mut() else {
            ui.colored_label(Color32::RED, self.startup_error.as_deref().unwrap_or("No editor"));
            return;
        };

        let tool = editor.current_tool();
        let pos = tool.current_pos();
        ui.label(format!("{}  ({}, {})", tool.name(), pos.x, pos.y));

        let size = editor.size();
        let scale = editor.pixel_size() as f32;
        let desired = Vec2::new(size.width as f32 * scale, size.height as f32 * scale);

        egui::ScrollArea::both().show(ui, |ui| {
            let (response, painter) = ui.allocate_painter(desired, Sense::click_and_drag());
            let rect = response.rect;
            editor.set_surface_origin(rect.min);
            self.input_handler.set_canvas_rect(rect);

            if std::mem::take(&mut self.needs_full_redraw) {
                editor.render(&mut self.raster, None);
            }

            for event in self.input_handler.process_input(ui.ctx()) {
                // gestures only start on the canvas
                if let InputEvent::PointerDown(pointer) = &event {
                    if !pointer.is_in_canvas {
                        continue;
                    }
                }
                editor.handle_input(&event, &mut self.raster);
            }

            if self.raster.take_changed() || self.texture.is_none() {
                let image = self.raster.image().clone();
                match &mut self.texture {
                    Some(texture) => texture.set(image, TextureOptions::NEAREST),
                    None => {
                        self.texture = Some(ui.ctx().load_texture("canvas", image, TextureOptions::NEAREST));
                    }
                }
            }
            if let Some(texture) = &self.texture {
                let uv = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
                painter.image(texture.id(), rect, uv, Color32::WHITE);
            }
        });
    }
}

impl eframe::App for PaintApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        if let Some(editor) = &self.editor {
            eframe::set_value(storage, eframe::APP_KEY, editor.config());
        }
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.side_panel(ctx);
        egui::CentralPanel::default().show(ctx, |ui| self.canvas(ui));
    }
}
