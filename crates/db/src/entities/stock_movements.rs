//! `SeaORM` Entity for the stock_movements table.
//!
//! Append-only audit log: one row per physical stock change, tagged with
//! the causing document's type and number so the change can be found and
//! reversed. Rows are deleted only when their document's effects are
//! reversed.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{DocumentType, MovementDirection, MovementReason};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub product_id: Uuid,
    pub moved_on: Date,
    pub direction: MovementDirection,
    pub quantity: i64,
    pub reason: MovementReason,
    pub document_type: Option<DocumentType>,
    pub document_number: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::products::Entity",
        from = "Column::ProductId",
        to = "super::products::Column::Id"
    )]
    Products,
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
