// src/ui/mod.rs
pub mod history;
pub mod plot;
pub mod query_form;
pub mod results;
pub mod widgets;
