pub use self::{environment::*, geometry::*, track::*};

pub(crate) mod environment;
pub(crate) mod geometry;
pub(crate) mod track;
