use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DatabaseConnection, Set};

/// Represents a taught class (course offering) in the `classes` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, serde::Serialize)]
#[sea_orm(table_name = "classes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Unique class code, e.g. "IT001".
    pub code: String,
    pub title: String,
    pub semester: Option<String>,
    /// The lecturer who owns this class.
    pub lecturer_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::LecturerId",
        to = "super::user::Column::Id"
    )]
    Lecturer,
    #[sea_orm(has_many = "super::class_session::Entity")]
    Sessions,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lecturer.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl Related<super::class_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DatabaseConnection,
        code: &str,
        title: &str,
        semester: Option<&str>,
        lecturer_id: i64,
    ) -> Result<Self, DbErr> {
        let now = Utc::now();
        let class = ActiveModel {
            code: Set(code.to_owned()),
            title: Set(title.to_owned()),
            semester: Set(semester.map(|s| s.to_owned())),
            lecturer_id: Set(lecturer_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        class.insert(db).await
    }
}
