pub mod equip;
pub mod error;
pub mod events;
pub mod locks;
pub mod relocate;
pub mod service;
pub mod slots;
pub mod stacking;
pub mod templates;
