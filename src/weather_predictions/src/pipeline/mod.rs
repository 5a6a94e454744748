pub mod api;
pub mod cleaner;
pub mod evaluate;
pub mod features;
pub mod linalg;
pub mod loader;
pub mod model;
pub mod report;
pub mod split;
