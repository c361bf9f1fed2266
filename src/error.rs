use std::error::Error as StdError;
use std::num::ParseIntError;

use log::error;
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder};
use thiserror::Error;

use crate::store::StoreError;
use crate::workbook::WorkbookError;

/// Request failures. The `Display` text is exactly what the client sees.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Error: All required fields must be filled.")]
    MissingField(&'static str),

    #[error("Error: Guest count must be a whole number.")]
    InvalidGuestCount(#[source] ParseIntError),

    #[error("Error: Could not save RSVP. Please try again.")]
    Save(#[source] StoreError),

    #[error("Error: Could not retrieve data.")]
    Retrieve(#[source] StoreError),

    #[error("Error: Could not retrieve data.")]
    Export(#[source] WorkbookError),
}

impl AppError {
    pub fn status(&self) -> Status {
        match self {
            AppError::MissingField(_) | AppError::InvalidGuestCount(_) => Status::BadRequest,
            AppError::Save(_) | AppError::Retrieve(_) | AppError::Export(_) => {
                Status::InternalServerError
            }
        }
    }
}

impl<'r> Responder<'r, 'static> for AppError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        if status.code >= 500 {
            match self.source() {
                Some(cause) => error!("{} {}: {cause}", req.method(), req.uri()),
                None => error!("{} {}: {self}", req.method(), req.uri()),
            }
        }

        (status, self.to_string()).respond_to(req)
    }
}
