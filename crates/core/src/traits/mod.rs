pub mod parameter_surface;

pub use parameter_surface::ParameterSurface;
