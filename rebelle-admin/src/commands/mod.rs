pub mod bindings;
pub mod check;
