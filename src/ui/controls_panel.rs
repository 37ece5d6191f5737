use eframe::egui;

use crate::config::FormOptions;
use crate::data::remote::{PlotLevel, RegenerationRequest};

/// What the side panel asked the app to do this frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlsAction {
    Regenerate(RegenerationRequest),
    ApplyScale { low: f64, high: f64 },
    ResetScale,
}

/// Values currently picked in the regeneration form.
#[derive(Debug, Clone)]
pub struct FormState {
    pub level: PlotLevel,
    pub model_generation: String,
    pub region: String,
    pub statistic: String,
    pub variable: String,
    pub season: String,
}

impl FormState {
    pub fn new(options: &FormOptions) -> Self {
        let first = |items: &[String]| items.first().cloned().unwrap_or_default();
        Self {
            level: PlotLevel::default(),
            model_generation: first(&options.model_generations),
            region: first(&options.regions),
            statistic: first(&options.statistics),
            variable: first(&options.variables),
            season: first(&options.seasons),
        }
    }

    pub fn request(&self) -> RegenerationRequest {
        RegenerationRequest {
            level: self.level,
            model_generation: self.model_generation.clone(),
            region: self.region.clone(),
            statistic: self.statistic.clone(),
            variable: self.variable.clone(),
            season: self.season.clone(),
        }
    }
}

/// The custom range override. Bounds live within the dataset's absolute
/// extent.
#[derive(Debug, Clone, Default)]
pub struct ScaleControl {
    pub enabled: bool,
    pub low: f64,
    pub high: f64,
    bounds: Option<(f64, f64)>,
}

impl ScaleControl {
    /// Reset after a reload: the override is off and the bounds follow the
    /// new data.
    pub fn reset(&mut self, bounds: Option<(f64, f64)>) {
        self.enabled = false;
        self.bounds = bounds;
        if let Some((lo, hi)) = bounds {
            self.low = lo;
            self.high = hi;
        }
    }

    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.bounds
    }

    fn clamp(&mut self) {
        if let Some((lo, hi)) = self.bounds {
            self.low = self.low.clamp(lo, hi);
            self.high = self.high.clamp(lo, hi);
        }
    }
}

fn combo(ui: &mut egui::Ui, label: &str, value: &mut String, items: &[String]) {
    egui::ComboBox::from_id_salt(format!("form_{label}"))
        .selected_text(value.as_str())
        .width(160.0)
        .show_ui(ui, |ui| {
            for item in items {
                ui.selectable_value(value, item.clone(), item);
            }
        });
    ui.label(label);
    ui.end_row();
}

pub fn show_controls(
    form: &mut FormState,
    scale: &mut ScaleControl,
    options: &FormOptions,
    busy: bool,
    ui: &mut egui::Ui,
) -> Option<ControlsAction> {
    let mut action = None;

    ui.heading("Regenerate");
    ui.add_space(4.0);
    for level in [PlotLevel::AllSeasonsByVariable, PlotLevel::AllVariablesBySeason] {
        ui.radio_value(&mut form.level, level, level.label());
    }
    ui.add_space(4.0);

    egui::Grid::new("regeneration_form")
        .num_columns(2)
        .spacing([8.0, 6.0])
        .show(ui, |ui| {
            combo(ui, "Generation", &mut form.model_generation, &options.model_generations);
            combo(ui, "Region", &mut form.region, &options.regions);
            combo(ui, "Statistic", &mut form.statistic, &options.statistics);
            match form.level {
                PlotLevel::AllSeasonsByVariable => {
                    combo(ui, "Variable", &mut form.variable, &options.variables)
                }
                PlotLevel::AllVariablesBySeason => {
                    combo(ui, "Season", &mut form.season, &options.seasons)
                }
            }
        });

    ui.add_space(4.0);
    ui.horizontal(|ui| {
        if ui.button("Submit").clicked() {
            action = Some(ControlsAction::Regenerate(form.request()));
        }
        if busy {
            ui.spinner();
        }
    });

    ui.separator();
    ui.heading("Scale");
    ui.add_space(4.0);

    let Some((lo, hi)) = scale.bounds() else {
        ui.label(egui::RichText::new("No numeric data").weak());
        return action;
    };

    if ui.checkbox(&mut scale.enabled, "Custom range").changed() && !scale.enabled {
        action = Some(ControlsAction::ResetScale);
    }

    ui.add_enabled_ui(scale.enabled, |ui| {
        ui.add(egui::Slider::new(&mut scale.low, lo..=hi).text("Low"));
        ui.add(egui::Slider::new(&mut scale.high, lo..=hi).text("High"));
        scale.clamp();
        if ui.button("Update Scale").clicked() {
            action = Some(ControlsAction::ApplyScale {
                low: scale.low,
                high: scale.high,
            });
        }
    });

    action
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_starts_on_first_options() {
        let options = FormOptions::default();
        let form = FormState::new(&options);
        let request = form.request();
        assert_eq!(request.level, PlotLevel::AllSeasonsByVariable);
        assert_eq!(request.model_generation, "cmip5");
        assert_eq!(request.variable, "pr");
        assert_eq!(request.season, "ann");
    }

    #[test]
    fn empty_option_lists_give_empty_fields() {
        let options = FormOptions {
            regions: Vec::new(),
            ..FormOptions::default()
        };
        assert_eq!(FormState::new(&options).region, "");
    }

    #[test]
    fn scale_control_follows_reloads() {
        let mut scale = ScaleControl::default();
        scale.reset(Some((-2.0, 5.0)));
        assert_eq!((scale.low, scale.high), (-2.0, 5.0));

        scale.enabled = true;
        scale.low = -10.0;
        scale.high = 3.0;
        scale.clamp();
        assert_eq!((scale.low, scale.high), (-2.0, 3.0));

        scale.reset(Some((0.0, 1.0)));
        assert!(!scale.enabled);
        assert_eq!((scale.low, scale.high), (0.0, 1.0));
    }
}
