//! An out-of-the-box chat assistant for anemia lab-result analysis.
//!
//! The crate includes a CLI tool for chatting in the terminal. And you can
//! also use it as a library to bring the assistant into your own host apps.

#![deny(missing_docs)]

mod session;

pub use session::{GREETING, Session, SessionBuilder};

/// Re-exports of [`hemachat_core`] crate.
pub mod core {
    pub use hemachat_core::*;
}
