pub(crate) mod health;
pub(crate) mod levels;
pub(crate) mod narrative;
