use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use eframe::egui;
use egui::{Color32, Pos2, Rect, Sense, Stroke, TextureOptions, Vec2};
use image::Rgba;

use pixelfe::canvas::Color;
use pixelfe::components::colors;
use pixelfe::io::{self, IoResult};
use pixelfe::{CanvasController, EditorError, EditorSettings, logger};

use crate::dialogs::{DialogResult, NewCanvasDialog};

/// Something the user asked for from a menu or shortcut this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MenuAction {
    New,
    Open,
    Save,
    Exit,
    Undo,
    Redo,
}

fn to_color32(c: Color) -> Color32 {
    Color32::from_rgba_unmultiplied(c[0], c[1], c[2], c[3])
}

fn from_color32(c: Color32) -> Color {
    Rgba(c.to_srgba_unmultiplied())
}

// ============================================================================
// APP
// ============================================================================

pub struct PixelFEApp {
    controller: CanvasController,
    settings: EditorSettings,
    /// Composite uploaded to the GPU, and the controller generation it shows.
    texture: Option<egui::TextureHandle>,
    texture_generation: u64,
    new_dialog: NewCanvasDialog,
    io_tx: mpsc::Sender<IoResult>,
    io_rx: mpsc::Receiver<IoResult>,
    pending_io: usize,
    /// True between a press on the canvas and the button release.
    stroke_active: bool,
    current_path: Option<PathBuf>,
    window_title: String,
    status: String,
    error_message: Option<String>,
}

impl PixelFEApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        controller: CanvasController,
        settings: EditorSettings,
    ) -> Self {
        let (io_tx, io_rx) = mpsc::channel();
        Self {
            controller,
            settings,
            texture: None,
            // Never a live generation, so the first frame uploads.
            texture_generation: u64::MAX,
            new_dialog: NewCanvasDialog::default(),
            io_tx,
            io_rx,
            pending_io: 0,
            stroke_active: false,
            current_path: None,
            window_title: String::new(),
            status: String::new(),
            error_message: None,
        }
    }

    // ---- actions ------------------------------------------------------------

    fn run_action(&mut self, ctx: &egui::Context, action: MenuAction) {
        match action {
            MenuAction::New => {
                let (w, h) = self.controller.buffer().dimensions();
                self.new_dialog.show_with(w, h);
            }
            MenuAction::Open => {
                let picked = rfd::FileDialog::new()
                    .add_filter("Images", &["png", "bmp", "gif", "jpg", "jpeg"])
                    .pick_file();
                if let Some(path) = picked {
                    tracing::info!("loading {}", path.display());
                    io::spawn_load(path, self.io_tx.clone());
                    self.pending_io += 1;
                    self.status = "Loading…".to_string();
                }
            }
            MenuAction::Save => {
                let default_name = self
                    .current_path
                    .as_ref()
                    .and_then(|p| p.file_name())
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "pixel_art.png".to_string());
                let picked = rfd::FileDialog::new()
                    .add_filter("PNG", &["png"])
                    .set_file_name(&default_name)
                    .save_file();
                if let Some(path) = picked {
                    io::spawn_save(self.controller.export_image(), path, self.io_tx.clone());
                    self.pending_io += 1;
                    self.status = "Saving…".to_string();
                }
            }
            MenuAction::Exit => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
            MenuAction::Undo => {
                let result = self.controller.undo();
                self.report(result);
            }
            MenuAction::Redo => {
                let result = self.controller.redo();
                self.report(result);
            }
        }
    }

    /// Surface user-facing errors; empty-history signals are only logged.
    fn report(&mut self, result: Result<(), EditorError>) {
        if let Err(e) = result {
            if e.is_user_facing() {
                tracing::warn!("{}", e);
                self.error_message = Some(e.to_string());
            } else {
                tracing::debug!("{}", e);
            }
        }
    }

    /// Apply finished background jobs on the UI thread.
    fn poll_io(&mut self, ctx: &egui::Context) {
        while let Ok(result) = self.io_rx.try_recv() {
            self.pending_io = self.pending_io.saturating_sub(1);
            match result {
                IoResult::Loaded { pixels, path } => match self.controller.load_image(pixels) {
                    Ok(()) => {
                        self.status = format!("Opened {}", path.display());
                        self.current_path = Some(path);
                    }
                    Err(e) => self.report(Err(e)),
                },
                IoResult::Saved(path) => {
                    tracing::info!("saved {}", path.display());
                    self.status = format!("Saved {}", path.display());
                    self.current_path = Some(path);
                }
                IoResult::LoadFailed(e) | IoResult::SaveFailed(e) => {
                    self.status.clear();
                    self.report(Err(e));
                }
            }
        }
        if self.pending_io > 0 {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
    }

    fn shortcuts(&self, ctx: &egui::Context) -> Vec<MenuAction> {
        if ctx.wants_keyboard_input() {
            return Vec::new();
        }
        let bindings = [
            (egui::Key::N, MenuAction::New),
            (egui::Key::O, MenuAction::Open),
            (egui::Key::S, MenuAction::Save),
            (egui::Key::Q, MenuAction::Exit),
            (egui::Key::Z, MenuAction::Undo),
            (egui::Key::Y, MenuAction::Redo),
        ];
        ctx.input_mut(|i| {
            bindings
                .iter()
                .filter(|(key, _)| {
                    i.consume_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, *key))
                })
                .map(|(_, action)| *action)
                .collect()
        })
    }

    // ---- panels -------------------------------------------------------------

    fn menu_bar(&self, ctx: &egui::Context, actions: &mut Vec<MenuAction>) {
        let can_undo = self.controller.can_undo();
        let can_redo = self.controller.can_redo();
        let command = |key: &str| format!("{}+{}", if cfg!(target_os = "macos") { "Cmd" } else { "Ctrl" }, key);

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    for (label, key, action) in [
                        ("New…", "N", MenuAction::New),
                        ("Open…", "O", MenuAction::Open),
                        ("Save…", "S", MenuAction::Save),
                    ] {
                        if ui.add(egui::Button::new(label).shortcut_text(command(key))).clicked() {
                            actions.push(action);
                            ui.close_menu();
                        }
                    }
                    ui.separator();
                    if ui.add(egui::Button::new("Exit").shortcut_text(command("Q"))).clicked() {
                        actions.push(MenuAction::Exit);
                        ui.close_menu();
                    }
                });
                ui.menu_button("Edit", |ui| {
                    let undo = egui::Button::new("Undo").shortcut_text(command("Z"));
                    if ui.add_enabled(can_undo, undo).clicked() {
                        actions.push(MenuAction::Undo);
                        ui.close_menu();
                    }
                    let redo = egui::Button::new("Redo").shortcut_text(command("Y"));
                    if ui.add_enabled(can_redo, redo).clicked() {
                        actions.push(MenuAction::Redo);
                        ui.close_menu();
                    }
                });
                ui.menu_button("Help", |ui| {
                    ui.label(format!("PixelFE {}", env!("CARGO_PKG_VERSION")));
                    match logger::log_path() {
                        Some(path) => ui.label(format!("Session log: {}", path.display())),
                        None => ui.label("Session log: stderr"),
                    };
                });
            });
        });
    }

    fn tool_panel(&mut self, ctx: &egui::Context) {
        let tools = self.controller.tools().clone();
        let mut color = to_color32(tools.color);
        let mut brush = tools.brush_size();
        let mut grid_cells = tools.grid_cell_size();
        let mut show_grid = tools.show_grid;
        let mut zoom = tools.zoom();
        let zoom_limit = self.controller.zoom_limit();

        egui::TopBottomPanel::top("tool_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                egui::color_picker::color_edit_button_srgba(
                    ui,
                    &mut color,
                    egui::color_picker::Alpha::OnlyBlend,
                );
                ui.monospace(colors::to_hex(tools.color));

                ui.label("Brush:");
                egui::ComboBox::from_id_source("brush_size")
                    .width(48.0)
                    .selected_text(brush.to_string())
                    .show_ui(ui, |ui| {
                        for size in tools.brush_range().sizes() {
                            ui.selectable_value(&mut brush, size, size.to_string());
                        }
                    });

                ui.label("Grid:");
                egui::ComboBox::from_id_source("grid_cells")
                    .width(48.0)
                    .selected_text(grid_cells.to_string())
                    .show_ui(ui, |ui| {
                        for &cells in &self.settings.grid_cell_sizes {
                            ui.selectable_value(&mut grid_cells, cells, cells.to_string());
                        }
                    });
                ui.checkbox(&mut show_grid, "Grid");

                ui.label("Zoom:");
                egui::ComboBox::from_id_source("zoom_level")
                    .width(48.0)
                    .selected_text(zoom.to_string())
                    .show_ui(ui, |ui| {
                        for &level in self.settings.zoom_levels.iter().filter(|&&z| z <= zoom_limit) {
                            ui.selectable_value(&mut zoom, level, level.to_string());
                        }
                    });
            });
        });

        let picked = from_color32(color);
        if picked != tools.color {
            self.controller.set_color(picked);
        }
        if brush != tools.brush_size() {
            self.controller.set_brush_size(brush);
        }
        if grid_cells != tools.grid_cell_size() {
            self.controller.set_grid_cell_size(grid_cells);
        }
        if show_grid != tools.show_grid {
            self.controller.set_grid_visible(show_grid);
        }
        if zoom != tools.zoom() {
            self.controller.set_zoom(zoom);
        }
    }

    fn palette_panel(&mut self, ctx: &egui::Context) {
        let mut picked: Option<Color> = None;
        let (w, h) = self.controller.buffer().dimensions();
        let history = self.controller.history();
        let summary = format!(
            "{}×{}  zoom {}  undo {} / redo {} ({:.1} MB)",
            w,
            h,
            self.controller.tools().zoom(),
            history.undo_count(),
            history.redo_count(),
            history.memory_usage() as f64 / (1024.0 * 1024.0),
        );

        egui::TopBottomPanel::bottom("palette").show(ctx, |ui| {
            ui.horizontal(|ui| {
                for rgba in &self.settings.palette {
                    let (rect, response) = ui.allocate_exact_size(Vec2::splat(24.0), Sense::click());
                    let painter = ui.painter();
                    painter.rect_filled(rect, 2.0, to_color32(Rgba(*rgba)));
                    painter.rect_stroke(rect, 2.0, Stroke::new(1.0, Color32::GRAY));
                    let response = response.on_hover_text(colors::to_hex(Rgba(*rgba)));
                    if response.clicked() {
                        picked = Some(Rgba(*rgba));
                    }
                }
                ui.separator();
                ui.label(summary);
                if !self.status.is_empty() {
                    ui.separator();
                    ui.label(&self.status);
                }
            });
        });

        if let Some(color) = picked {
            self.controller.set_color(color);
        }
    }

    fn canvas_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(Color32::DARK_GRAY))
            .show(ctx, |ui| {
                let (rect, response) =
                    ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
                self.controller
                    .set_viewport(rect.width().max(0.0) as u32, rect.height().max(0.0) as u32);

                self.handle_pointer(ui, &response, rect);
                self.sync_texture(ui.ctx());

                let (ox, oy) = self.controller.composite_offset();
                let (cw, ch) = self.controller.composite_size();
                let image_rect = Rect::from_min_size(
                    rect.min + Vec2::new(ox as f32, oy as f32),
                    Vec2::new(cw as f32, ch as f32),
                );
                if let Some(texture) = &self.texture {
                    ui.painter_at(rect).image(
                        texture.id(),
                        image_rect,
                        Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                        Color32::WHITE,
                    );
                }
            });
    }

    /// Press on the canvas starts a stroke; holding the button continues it.
    fn handle_pointer(&mut self, ui: &egui::Ui, response: &egui::Response, rect: Rect) {
        let (pressed, down, pos) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_down(),
                i.pointer.interact_pos(),
            )
        });

        if let Some(pos) = pos {
            let local = pos - rect.min;
            let (x, y) = (local.x.floor() as i32, local.y.floor() as i32);
            if pressed && response.hovered() {
                self.stroke_active = true;
                self.controller.pointer_down(x, y);
            } else if down && self.stroke_active {
                self.controller.pointer_drag(x, y);
            }
        }

        if !down && self.stroke_active {
            self.stroke_active = false;
            self.controller.pointer_up();
        }
    }

    /// Re-upload the composite whenever the controller state moved on.
    fn sync_texture(&mut self, ctx: &egui::Context) {
        let generation = self.controller.generation();
        if generation == self.texture_generation {
            return;
        }

        let max_side = ctx.input(|i| i.max_texture_side);
        let (cw, ch) = self.controller.composite_size();
        if cw as usize > max_side || ch as usize > max_side {
            tracing::warn!("composite {}x{} exceeds texture limit {}", cw, ch, max_side);
            self.texture = None;
            self.texture_generation = generation;
            return;
        }

        let composite = self.controller.composite();
        let image = egui::ColorImage::from_rgba_unmultiplied(
            [composite.width() as usize, composite.height() as usize],
            composite.as_raw(),
        );
        match &mut self.texture {
            Some(texture) => texture.set(image, TextureOptions::NEAREST),
            None => {
                self.texture = Some(ctx.load_texture("composite", image, TextureOptions::NEAREST));
            }
        }
        self.texture_generation = generation;
    }

    fn error_window(&mut self, ctx: &egui::Context) {
        let Some(message) = self.error_message.clone() else { return };
        let mut dismissed = false;
        egui::Window::new("Error")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(message);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        if dismissed {
            self.error_message = None;
        }
    }
}

impl eframe::App for PixelFEApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let title = match &self.current_path {
            Some(path) => format!("PixelFE - {}", path.display()),
            None => "PixelFE".to_string(),
        };
        if title != self.window_title {
            self.window_title = title.clone();
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title));
        }

        let max_side = ctx.input(|i| i.max_texture_side);
        let limit = self.settings.max_composite_edge.min(max_side.min(u32::MAX as usize) as u32);
        self.controller.set_max_composite_edge(limit);

        self.poll_io(ctx);

        let mut actions = self.shortcuts(ctx);
        self.menu_bar(ctx, &mut actions);
        self.tool_panel(ctx);
        self.palette_panel(ctx);
        self.canvas_panel(ctx);

        for action in actions {
            self.run_action(ctx, action);
        }

        if let DialogResult::Ok((w, h)) = self.new_dialog.show(ctx) {
            if let Err(e) = self.controller.new_canvas(w, h) {
                self.new_dialog.reject(e.to_string());
            } else {
                self.current_path = None;
                self.status.clear();
            }
        }

        self.error_window(ctx);
    }
}
