//! Use-case services composed from repository and markdown engine.

pub mod note_service;
