use sea_orm::entity::prelude::*;

/// One favorite membership. The process-wide aggregate is the full set of
/// rows; (kind, entity_id) pairs are unique.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "favorites")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// One of "artist", "album", "track".
    pub kind: String,
    pub entity_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
