// Library root
// -----------
// The `docpdf` binary is a thin shell over these modules:
// - `conversion`: conversion type tags and the file extensions they accept.
// - `config`: where the conversion server lives (flag, env, config file).
// - `api`: the blocking HTTP client for the server's `/upload` endpoint.
// - `ui`: the pick/upload/report flow and the interactive menu.
pub mod api;
pub mod config;
pub mod conversion;
pub mod ui;
