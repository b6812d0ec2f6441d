//! egui overlay: body list, info card, status bar and notices
//!
//! The overlay only reads scene state. Anything the user asks for comes back
//! as [`OverlayAction`]s for the app to apply after the frame.

use egui::{Color32, Context, RichText};
use orrery::registry::{BodyId, BodyKind};
use orrery::scene::Orrery;
use orrery::selection::Selection;
use orrery::FlightState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayAction {
    Select(BodyId, f32),
    ReturnToOverview,
    SetPaused(bool),
    SetTimeScale(f32),
    SetShowOrbits(bool),
    DismissNotice,
}

/// Everything the overlay displays for one frame.
pub struct OverlayView<'a> {
    pub orrery: &'a Orrery,
    pub selection: Option<&'a Selection>,
    pub flight: FlightState,
    pub paused: bool,
    pub time_scale: f32,
    pub max_time_scale: f32,
    pub show_orbits: bool,
    pub fps: Option<f32>,
    pub notice: Option<&'a str>,
}

pub fn draw_overlay(ctx: &Context, view: &OverlayView) -> Vec<OverlayAction> {
    let mut actions = Vec::new();

    draw_status_bar(ctx, view, &mut actions);
    draw_side_panel(ctx, view, &mut actions);

    if let Some(notice) = view.notice {
        draw_notice(ctx, notice, &mut actions);
    }

    actions
}

fn draw_status_bar(ctx: &Context, view: &OverlayView, actions: &mut Vec<OverlayAction>) {
    egui::TopBottomPanel::top("status").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.label(format!("Camera: {}", view.flight.label()));
            ui.separator();

            if view.paused {
                ui.label(RichText::new("PAUSED").color(Color32::YELLOW));
            } else {
                ui.label(RichText::new("RUNNING").color(Color32::GREEN));
            }
            let toggle = if view.paused { "Resume" } else { "Pause" };
            if ui.button(toggle).clicked() {
                actions.push(OverlayAction::SetPaused(!view.paused));
            }
            ui.separator();

            let mut time_scale = view.time_scale;
            let slider = egui::Slider::new(&mut time_scale, 0.0..=view.max_time_scale)
                .logarithmic(true)
                .text("time")
                .suffix("x");
            if ui.add(slider).changed() {
                actions.push(OverlayAction::SetTimeScale(time_scale));
            }
            ui.separator();

            let mut show_orbits = view.show_orbits;
            if ui.checkbox(&mut show_orbits, "Orbits").changed() {
                actions.push(OverlayAction::SetShowOrbits(show_orbits));
            }

            if let Some(fps) = view.fps {
                ui.separator();
                ui.label(format!("{fps:.0} fps"));
            }
        });
    });
}

fn draw_side_panel(ctx: &Context, view: &OverlayView, actions: &mut Vec<OverlayAction>) {
    egui::SidePanel::right("bodies_panel")
        .resizable(true)
        .default_width(260.0)
        .show(ctx, |ui| {
            ui.heading(RichText::new("Solar System").color(Color32::LIGHT_BLUE));
            ui.separator();

            egui::ScrollArea::vertical().show(ui, |ui| {
                if let Some(selection) = view.selection {
                    draw_info_card(ui, view.orrery, selection, actions);
                    ui.add_space(8.0);
                }

                ui.collapsing(RichText::new("Bodies").strong(), |ui| {
                    for node in view.orrery.bodies() {
                        let config = node.config;
                        let indent = if config.kind == BodyKind::Moon { "    " } else { "" };
                        let selected = view.selection.map(|s| s.body) == Some(config.id);
                        let label = format!("{indent}{}", config.name);
                        if ui.selectable_label(selected, label).clicked() {
                            actions.push(OverlayAction::Select(config.id, config.visual_radius));
                        }
                    }
                });

                ui.add_space(8.0);
                ui.collapsing(RichText::new("Controls").strong(), |ui| {
                    egui::Grid::new("controls_grid")
                        .num_columns(2)
                        .spacing([10.0, 4.0])
                        .show(ui, |ui| {
                            for (key, meaning) in CONTROLS {
                                ui.label(RichText::new(*key).monospace().color(Color32::LIGHT_GREEN));
                                ui.label(*meaning);
                                ui.end_row();
                            }
                        });
                });
            });
        });
}

fn draw_info_card(
    ui: &mut egui::Ui,
    orrery: &Orrery,
    selection: &Selection,
    actions: &mut Vec<OverlayAction>,
) {
    let (Some(node), Some(info)) = (orrery.body(selection.body), orrery.describe(selection))
    else {
        return;
    };
    let config = node.config;

    ui.group(|ui| {
        ui.label(RichText::new(config.name).heading().color(Color32::YELLOW));
        let kind = match config.kind {
            BodyKind::Star => "Star",
            BodyKind::Planet => "Planet",
            BodyKind::Moon => "Moon",
        };
        ui.label(RichText::new(kind).small().italics());
        ui.add_space(4.0);

        egui::Grid::new("info_grid")
            .num_columns(2)
            .spacing([10.0, 4.0])
            .show(ui, |ui| {
                for (field, value) in [
                    ("Diameter", info.diameter),
                    ("Day length", info.day_length),
                    ("Temperature", info.temperature),
                ] {
                    ui.label(RichText::new(field).strong());
                    ui.label(value);
                    ui.end_row();
                }
            });

        ui.add_space(4.0);
        ui.label(info.description);
        ui.add_space(6.0);

        if ui.button("Back to overview").clicked() {
            actions.push(OverlayAction::ReturnToOverview);
        }
    });
}

fn draw_notice(ctx: &Context, notice: &str, actions: &mut Vec<OverlayAction>) {
    egui::Window::new(RichText::new("Configuration problem").color(Color32::LIGHT_RED))
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_TOP, [0.0, 48.0])
        .show(ctx, |ui| {
            ui.label(notice);
            ui.add_space(6.0);
            if ui.button("Dismiss").clicked() {
                actions.push(OverlayAction::DismissNotice);
            }
        });
}

const CONTROLS: &[(&str, &str)] = &[
    ("Left drag", "Orbit camera"),
    ("Scroll", "Zoom"),
    ("Click", "Fly to body"),
    ("Esc", "Back to overview"),
    ("0-8", "Sun and planets"),
    ("Space", "Pause orbits"),
    ("+ / -", "Time scale"),
    ("O", "Orbit paths"),
];
