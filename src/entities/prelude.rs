pub use super::albums::Entity as Albums;
pub use super::artists::Entity as Artists;
pub use super::favorites::Entity as Favorites;
pub use super::tracks::Entity as Tracks;
pub use super::users::Entity as Users;
