pub mod classifier;
pub mod data_core;
pub mod dirty;
pub mod editor;
pub mod pairing;
pub mod path;
pub mod performance;
pub mod shadow_tree;
pub mod template;
