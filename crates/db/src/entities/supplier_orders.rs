//! `SeaORM` Entity for the supplier_orders table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::SupplierOrderStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "supplier_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub number: String,
    pub supplier_name: String,
    pub status: SupplierOrderStatus,
    pub issued_on: Date,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::supplier_order_items::Entity")]
    SupplierOrderItems,
}

impl Related<super::supplier_order_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SupplierOrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
