//! First-person underwater camera.
//!
//! Fixed-step movement from keyboard, touch and the page's on-screen
//! direction buttons, with the height kept above the seafloor.

/// Camera component, input systems and viewport resize reporting.
pub mod ocean_camera;
