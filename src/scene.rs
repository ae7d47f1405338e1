pub(crate) mod hit;
pub(crate) mod registry;
pub(crate) mod sprite;
