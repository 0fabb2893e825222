pub mod analysis;
pub mod label_propagation;
