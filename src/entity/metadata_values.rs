use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "metadata_values")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub category_metadata_id: String,
    pub label: String,
    pub label_en: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category_metadata::Entity",
        from = "Column::CategoryMetadataId",
        to = "super::category_metadata::Column::Id",
        on_delete = "Cascade"
    )]
    CategoryMetadata,
}

impl Related<super::category_metadata::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CategoryMetadata.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
