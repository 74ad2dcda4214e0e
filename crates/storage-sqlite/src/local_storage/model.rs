use diesel::prelude::*;

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(primary_key(storage_key))]
#[diesel(table_name = crate::schema::local_storage)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct LocalStorageEntryDB {
    pub storage_key: String,
    pub value: String,
    pub updated_at: String,
}
