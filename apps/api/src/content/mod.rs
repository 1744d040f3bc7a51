// Read/write endpoints for stored entities: briefs, contents, outlines, series, users.
// Generation itself lives in crate::generation.

pub mod handlers;
pub mod service;
