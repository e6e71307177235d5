//! Mandel engine crate.
//!
//! Platform + GPU runtime for fragment-shader viewers: a GL-style graphics
//! context over wgpu, the shader unit/program lifecycle, the pixel → plane view
//! transform with its pointer controller, and the winit loop that drives a
//! [`core::Handler`].

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod render;
pub mod gfx;
pub mod shader;
pub mod view;
