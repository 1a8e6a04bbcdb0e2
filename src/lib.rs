//! A tide and weather face for a small e-paper panel, plus the companion
//! process that feeds it over a Unix socket.

pub mod companion;
pub mod config;
pub mod face;
pub mod layout;
pub mod link;
pub mod message;
pub mod palette;
pub mod prop;
pub mod settings;
pub mod shell;
pub mod text;

// The panel driver only makes sense on the Pi. Everywhere else it's
// swapped for a stub so the rest of the crate still compiles and tests.
#[cfg(target_arch = "arm")]
pub mod panel;
#[cfg(not(target_arch = "arm"))]
#[path = "mock_panel.rs"]
pub mod panel;
