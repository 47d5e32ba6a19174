use eframe::egui;

use pixelfe::canvas;

/// Result of showing a dialog for one frame.
pub enum DialogResult<T> {
    /// Dialog is still open, no action needed this frame.
    Open,
    /// User clicked OK - contains the final values.
    Ok(T),
    /// User clicked Cancel.
    Cancel,
}

// ============================================================================
// NEW CANVAS
// ============================================================================

/// "Canvas Size (width x height)" prompt.
///
/// Only syntax is checked here; range errors come back from the controller
/// through [`reject`](Self::reject) and keep the dialog open.
#[derive(Default)]
pub struct NewCanvasDialog {
    pub open: bool,
    input: String,
    error: Option<String>,
    focus_pending: bool,
}

impl NewCanvasDialog {
    pub fn show_with(&mut self, width: u32, height: u32) {
        self.open = true;
        self.input = format!("{}x{}", width, height);
        self.error = None;
        self.focus_pending = true;
    }

    /// Reopen with an error under the text field.
    pub fn reject(&mut self, message: String) {
        self.open = true;
        self.error = Some(message);
        self.focus_pending = true;
    }

    pub fn show(&mut self, ctx: &egui::Context) -> DialogResult<(i64, i64)> {
        if !self.open {
            return DialogResult::Open;
        }

        let mut submit = false;
        let mut cancel = false;

        egui::Window::new("New Canvas")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.set_min_width(260.0);
                ui.label("Canvas Size (width x height):");
                let edit = ui.add(
                    egui::TextEdit::singleline(&mut self.input)
                        .hint_text("32x32")
                        .desired_width(f32::INFINITY),
                );
                if self.focus_pending {
                    edit.request_focus();
                    self.focus_pending = false;
                }

                if let Some(err) = &self.error {
                    ui.colored_label(egui::Color32::from_rgb(220, 80, 80), err);
                }

                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() {
                        submit = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancel = true;
                    }
                });
            });

        let (enter, escape) =
            ctx.input(|i| (i.key_pressed(egui::Key::Enter), i.key_pressed(egui::Key::Escape)));
        submit |= enter;
        cancel |= escape;

        if cancel {
            self.open = false;
            return DialogResult::Cancel;
        }
        if submit {
            match canvas::parse_dimensions(&self.input) {
                Ok(dims) => {
                    self.open = false;
                    self.error = None;
                    return DialogResult::Ok(dims);
                }
                Err(e) => self.error = Some(e.to_string()),
            }
        }
        DialogResult::Open
    }
}
