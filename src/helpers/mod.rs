//! Helper functions used by the templates and the server
//!
//! HTML output of rendered post text, escaping, dates and URLs.

mod date;
mod html;
mod url;

pub use date::*;
pub use html::*;
pub use url::*;
