pub mod action;
pub mod bundle;
pub mod event;
pub mod responses;

pub use action::*;
pub use bundle::*;
pub use event::*;
pub use responses::*;
