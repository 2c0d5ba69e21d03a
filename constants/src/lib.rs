pub mod animation;
pub mod card;
pub mod feedback;
pub mod layout;
