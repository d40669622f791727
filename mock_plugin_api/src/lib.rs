//! A stand-in for the remote plugin API: serves one JSON document on
//! `GET /` and replaces it on `POST /`.

mod sample;
mod server;

pub use sample::sample_payload;
pub use server::MockApi;
