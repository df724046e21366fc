pub mod catalog;
pub mod night;
pub mod registry;
pub mod session;
pub mod timer;
pub mod trial;
pub mod variants;
pub mod win;
