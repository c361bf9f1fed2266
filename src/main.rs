#[macro_use] extern crate rocket;
use log::{error, info};
use rocket::fairing::{self, AdHoc};
use rocket::figment::Figment;
use rocket::form::Form;
use rocket::http::Status;
use rocket::tokio::task::spawn_blocking;
use rocket::{Build, Request, Rocket, State};
use rocket_dyn_templates::{Template, context};

use config::RsvpConfig;
use error::AppError;
use export::{Export, XlsxDownload};
use models::NewRsvp;
use store::Store;

pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod schema;
pub mod store;
pub mod workbook;


#[derive(FromForm, Default)]
struct Submission {
    name: Option<String>,
    email: Option<String>,
    contact: Option<String>,
    guests: Option<String>,
    attendance: Option<String>,
    #[field(name = "guestNames")]
    guest_names: Option<String>,
}

fn required(value: Option<String>, field: &'static str) -> Result<String, AppError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::MissingField(field)),
    }
}

impl Submission {
    fn validate(self) -> Result<NewRsvp, AppError> {
        let name = required(self.name, "name")?;
        let email = required(self.email, "email")?;
        let contact = required(self.contact, "contact")?;
        let guests = required(self.guests, "guests")?;
        let attendance = required(self.attendance, "attendance")?;

        let guests = guests.trim().parse::<i32>().map_err(AppError::InvalidGuestCount)?;
        let guest_names = self.guest_names.filter(|names| !names.is_empty());

        Ok(NewRsvp { name, email, contact, guests, attendance, guest_names })
    }
}

/// Log line for an accepted RSVP. Names and contact details stay out of logs.
fn stored_summary(rsvp: &NewRsvp) -> String {
    format!("RSVP stored: attendance {:?}, {} guests", rsvp.attendance, rsvp.guests)
}

#[get("/")]
fn index(config: &State<RsvpConfig>) -> Template {
    Template::render("index", context! {
        event_name: &config.event_name,
    })
}

#[post("/rsvp", data = "<submission>")]
async fn submit(submission: Form<Submission>, store: &State<Store>) -> Result<&'static str, AppError> {
    let rsvp = submission.into_inner().validate()?;
    let summary = stored_summary(&rsvp);

    store.insert(rsvp).await.map_err(AppError::Save)?;

    info!("{summary}");
    Ok("RSVP submitted! Thank you.")
}

#[get("/download")]
async fn download(store: &State<Store>, config: &State<RsvpConfig>) -> Result<Export, AppError> {
    let rsvps = store.all().await.map_err(AppError::Retrieve)?;
    if rsvps.is_empty() {
        return Ok(Export::Empty(()));
    }

    let dir = config.export_dir.clone();
    let bytes = spawn_blocking(move || export::render(&rsvps, &dir))
        .await
        .map_err(|e| AppError::Retrieve(e.into()))?
        .map_err(AppError::Export)?;

    Ok(Export::File(XlsxDownload::new(bytes)))
}

#[catch(default)]
fn plain_error(status: Status, _req: &Request<'_>) -> String {
    format!("Error: {}", status.reason_lossy())
}

async fn open_store(rocket: Rocket<Build>) -> fairing::Result {
    let config = match rocket.state::<RsvpConfig>() {
        Some(config) => config.clone(),
        None => {
            error!("RSVP configuration was not loaded");
            return Err(rocket);
        }
    };

    match store::open(&config).await {
        Ok(store) => Ok(rocket.manage(store)),
        Err(e) => {
            error!("Could not open {:?} RSVP store: {e}", config.storage);
            Err(rocket)
        }
    }
}

/// Routes, templates and configuration, without a store.
fn app(figment: Figment) -> Rocket<Build> {
    rocket::custom(figment)
        .mount("/", routes![index, submit, download])
        .register("/", catchers![plain_error])
        .attach(Template::fairing())
        .attach(AdHoc::config::<RsvpConfig>())
}

#[launch]
fn rocket() -> _ {
    app(config::figment())
        .attach(AdHoc::try_on_ignite("RSVP Store", open_store))
}
