use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub site_url: String,
    pub cms_provider: Option<String>,
    pub industry: Option<String>,
    pub description: Option<String>,
    pub differentiators_json: String,
    pub competitors_json: String,
    pub autopilot_enabled: bool,
    pub autopilot_scopes_json: String,
    pub site_script_status: String,
    pub cms_credentials_enc: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
