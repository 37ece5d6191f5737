pub mod load_tracker;
pub mod palette;
pub mod scales;
pub mod selection;
pub mod session;
pub mod theme;
