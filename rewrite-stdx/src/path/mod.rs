mod normalize;
mod parts;

pub use normalize::KeyExt;
pub use parts::PathParts;
