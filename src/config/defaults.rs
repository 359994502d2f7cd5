//! Default value functions for serde deserialization.

pub fn commutativity_weight() -> f64 {
    1e-3
}

pub fn residual_tolerance() -> f64 {
    1e-9
}

pub fn max_dimension() -> usize {
    60
}

pub fn zoomout_step() -> usize {
    1
}

pub fn kernel_width() -> f64 {
    0.1
}

pub fn sigma_start() -> f64 {
    0.2
}

pub fn sigma_end() -> f64 {
    0.05
}
