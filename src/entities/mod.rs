pub mod prelude;

pub mod albums;
pub mod artists;
pub mod favorites;
pub mod tracks;
pub mod users;
