use super::schema::rsvps;
use diesel::prelude::*;
use serde::{Serialize, Deserialize};

#[derive(Queryable, Selectable, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[diesel(table_name = rsvps)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Rsvp {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub contact: String,
    pub guests: i32,
    pub attendance: String,
    pub guest_names: Option<String>,
}

/// A validated submission that has not been stored yet.
#[derive(Insertable, Clone, Debug, PartialEq, Eq)]
#[diesel(table_name = rsvps)]
pub struct NewRsvp {
    pub name: String,
    pub email: String,
    pub contact: String,
    pub guests: i32,
    pub attendance: String,
    pub guest_names: Option<String>,
}

impl NewRsvp {
    pub fn with_id(self, id: i32) -> Rsvp {
        Rsvp {
            id,
            name: self.name,
            email: self.email,
            contact: self.contact,
            guests: self.guests,
            attendance: self.attendance,
            guest_names: self.guest_names,
        }
    }
}
