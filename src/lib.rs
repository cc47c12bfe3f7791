//! edtool library: external tool engine for a text editor. Config, collaborator seams, descriptors, resolver, runner, router, save gate.

pub mod config;
pub mod editor;
pub mod engine;
pub mod tool;
