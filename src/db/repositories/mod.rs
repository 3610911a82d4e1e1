pub mod album;
pub mod artist;
pub mod favorites;
pub mod track;
pub mod user;
