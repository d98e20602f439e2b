use sea_orm::entity::prelude::*;

/// Storefront settings. The application treats the first row as the store.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "stores")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub topbar_text: Option<String>,
    pub topbar_text_en: Option<String>,
    pub instagram: Option<String>,
    pub facebook: Option<String>,
    pub email: Option<String>,
    pub whatsapp: Option<String>,
    pub copyright: Option<String>,
    pub copyright_en: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::store_benefits::Entity")]
    StoreBenefits,
}

impl Related<super::store_benefits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StoreBenefits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
