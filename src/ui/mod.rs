pub mod chart_panel;
pub mod controls_panel;
pub mod grid_panel;
pub mod legend;
pub mod toast;
