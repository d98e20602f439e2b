use sea_orm::entity::prelude::*;

/// Links a product to one value of one of its category's facets.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "product_metadata")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub product_id: Uuid,
    pub category_metadata_id: String,
    pub metadata_value_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::products::Entity",
        from = "Column::ProductId",
        to = "super::products::Column::Id",
        on_delete = "Cascade"
    )]
    Products,
    #[sea_orm(
        belongs_to = "super::category_metadata::Entity",
        from = "Column::CategoryMetadataId",
        to = "super::category_metadata::Column::Id",
        on_delete = "Cascade"
    )]
    CategoryMetadata,
    #[sea_orm(
        belongs_to = "super::metadata_values::Entity",
        from = "Column::MetadataValueId",
        to = "super::metadata_values::Column::Id",
        on_delete = "Cascade"
    )]
    MetadataValues,
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
