mod email;
mod health_check;
mod json;

pub use email::*;
pub use health_check::*;
pub use json::*;
