pub mod orientation;
pub mod size_fitter;
