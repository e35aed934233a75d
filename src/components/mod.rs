pub mod export_panel;
pub mod force_graph;
pub mod nav;
