pub mod atlas;
pub mod inspect;
