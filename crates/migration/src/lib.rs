pub use sea_orm_migration::prelude::*;

mod m20240301_120000_users;
mod m20240301_121000_rubrics;
mod m20240301_122000_bbs;
mod m20240415_090000_sms;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_120000_users::Migration),
            Box::new(m20240301_121000_rubrics::Migration),
            Box::new(m20240301_122000_bbs::Migration),
            Box::new(m20240415_090000_sms::Migration),
        ]
    }
}
