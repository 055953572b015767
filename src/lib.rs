// Library exports for the Emotion Recorder

pub mod camera;
pub mod chart;
pub mod config;
pub mod controller;
pub mod emotion;
pub mod error;
pub mod models;
pub mod session;
pub mod ui;
